//! # Surface Mapper
//!
//! Projects plate-space feature positions onto the carrier surface.
//!
//! Every primitive is built in a local frame whose +Z is "up" (out of the
//! surface). The mapper returns a [`Pose`] whose rotation carries local +Z
//! onto the outward surface normal:
//!
//! - Flat: identity rotation, position `(x, y, thickness − depth)`.
//! - Cylinder: `θ = x / circumference · 2π + seam`, rotation columns
//!   `(tangent, axial, radial)`, position `radial · (R − depth) + axial · y`.

use glam::{DAffine3, DMat3, DVec2, DVec3};

use crate::layout::{Feature, FeatureKind, FeatureOp};
use crate::spec::{CarrierSpec, CylinderSpec, PlateSpec};

/// Rigid placement of a solid in carrier space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    /// Columns: local X, local Y, local Z (up) expressed in world space.
    pub rotation: DMat3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Pose at the origin with no rotation.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DMat3::IDENTITY,
    };

    /// Unrotated pose at `position`.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            rotation: DMat3::IDENTITY,
        }
    }

    /// World direction of the solid's local +Z axis.
    #[inline]
    pub fn up(&self) -> DVec3 {
        self.rotation.z_axis
    }

    /// Returns the same pose shifted by `offset`.
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            position: self.position + offset,
            rotation: self.rotation,
        }
    }

    /// Affine transform from local to carrier space.
    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_mat3_translation(self.rotation, self.position)
    }
}

/// How far a feature's pose sits below the surface.
///
/// Subtractive features are seated at their depth so the solid's local
/// z = 0 is the floor of the cut. Additive features sit on the surface.
pub fn feature_depth(spec: &PlateSpec, feature: &Feature) -> f64 {
    match (feature.op, feature.kind) {
        (FeatureOp::Union, _) | (_, FeatureKind::Bore) => 0.0,
        (FeatureOp::Subtract, FeatureKind::Dot) => spec.recess.depth,
        (FeatureOp::Subtract, FeatureKind::IndicatorStart | FeatureKind::IndicatorEnd) => {
            spec.indicator_depth
        }
    }
}

/// Angle of plate-space X on a cylinder, seam offset included (radians).
///
/// # Example
///
/// ```rust
/// use braille_mesh::spec::CylinderSpec;
/// use braille_mesh::surface::cylinder_angle;
///
/// let cyl = CylinderSpec::default();
/// let theta = cylinder_angle(&cyl, cyl.circumference() / 4.0);
/// assert!((theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn cylinder_angle(cyl: &CylinderSpec, x: f64) -> f64 {
    x / cyl.circumference() * std::f64::consts::TAU + cyl.seam_offset_rad()
}

/// Maps a plate-space point onto the carrier, `depth` below the surface.
pub fn map_point(carrier: &CarrierSpec, local: DVec2, depth: f64) -> Pose {
    match carrier {
        CarrierSpec::Flat(flat) => Pose::at(DVec3::new(local.x, local.y, flat.thickness - depth)),
        CarrierSpec::Cylinder(cyl) => {
            let theta = cylinder_angle(cyl, local.x);
            let (sin, cos) = theta.sin_cos();
            let radial = DVec3::new(cos, sin, 0.0);
            let tangent = DVec3::new(-sin, cos, 0.0);
            Pose {
                position: radial * (cyl.radius() - depth) + DVec3::Z * local.y,
                rotation: DMat3::from_cols(tangent, DVec3::Z, radial),
            }
        }
    }
}

/// Maps a feature onto the carrier.
///
/// Bores are not surface features; they stay at the origin.
pub fn map_feature(spec: &PlateSpec, feature: &Feature) -> Pose {
    if feature.kind == FeatureKind::Bore {
        return Pose::IDENTITY;
    }
    map_point(&spec.carrier, feature.local, feature_depth(spec, feature))
}
