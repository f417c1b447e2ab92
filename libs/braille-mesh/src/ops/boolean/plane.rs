//! # Plane for BSP Operations
//!
//! Plane representation with point classification.

use config::constants::BSP_EPSILON;
use glam::DVec3;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Side of a plane. Values are bit flags so polygon classes can be OR-ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Side {
    Coplanar = 0,
    Front = 1,
    Back = 2,
    Spanning = 3,
}

impl Side {
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Side::Coplanar,
            1 => Side::Front,
            2 => Side::Back,
            _ => Side::Spanning,
        }
    }
}

// =============================================================================
// PLANE
// =============================================================================

/// A plane `normal · p = w` with unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub w: f64,
}

impl Plane {
    /// Plane through three points, normal by the right-hand rule.
    ///
    /// Returns `None` for collinear or coincident points.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let normal = (b - a).cross(c - a).try_normalize()?;
        Some(Self {
            normal,
            w: normal.dot(a),
        })
    }

    /// Reverses the plane orientation.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Positive in front, negative behind.
    #[inline]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.w
    }

    /// Classifies a point with [`BSP_EPSILON`] thickness.
    #[inline]
    pub fn classify(&self, point: DVec3) -> Side {
        let t = self.signed_distance(point);
        if t < -BSP_EPSILON {
            Side::Back
        } else if t > BSP_EPSILON {
            Side::Front
        } else {
            Side::Coplanar
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::Y).unwrap();
        assert_eq!(plane.normal, DVec3::Z);
        assert_eq!(plane.w, 0.0);
    }

    #[test]
    fn test_plane_degenerate() {
        assert!(Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::X * 2.0).is_none());
    }

    #[test]
    fn test_plane_classify() {
        let mut plane = Plane::from_points(DVec3::Z, DVec3::Z + DVec3::X, DVec3::Z + DVec3::Y)
            .unwrap();
        assert_eq!(plane.classify(DVec3::new(3.0, 4.0, 2.0)), Side::Front);
        assert_eq!(plane.classify(DVec3::ZERO), Side::Back);
        assert_eq!(plane.classify(DVec3::new(5.0, 5.0, 1.0 + 1e-7)), Side::Coplanar);

        plane.flip();
        assert_eq!(plane.classify(DVec3::ZERO), Side::Front);
    }

    #[test]
    fn test_side_bits() {
        assert_eq!(Side::from_bits(Side::Front as u8 | Side::Back as u8), Side::Spanning);
        assert_eq!(Side::from_bits(Side::Coplanar as u8 | Side::Front as u8), Side::Front);
    }
}
