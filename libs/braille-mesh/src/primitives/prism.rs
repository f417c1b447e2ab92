//! # Prism Extrusion
//!
//! Extrudes a convex outline along Z. Used for the cylinder carrier (banded
//! into rings), the axial bore and the row indicator markers.

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use glam::DVec2;

/// Vertices of a regular polygon, counter-clockwise, first corner on +X.
///
/// # Example
///
/// ```rust
/// use braille_mesh::primitives::regular_polygon;
///
/// let hex = regular_polygon(2.0, 6);
/// assert_eq!(hex.len(), 6);
/// assert!((hex[0].x - 2.0).abs() < 1e-12);
/// ```
pub fn regular_polygon(circumradius: f64, sides: u32) -> Vec<DVec2> {
    (0..sides)
        .map(|i| {
            let (sin, cos) = (std::f64::consts::TAU * i as f64 / sides as f64).sin_cos();
            DVec2::new(circumradius * cos, circumradius * sin)
        })
        .collect()
}

/// Extrudes a convex counter-clockwise outline from `z0` to `z1`.
///
/// Caps are fanned from the outline's centroid.
pub fn extrude_convex(outline: &[DVec2], z0: f64, z1: f64) -> MeshResult<Mesh> {
    extrude_banded(outline, z0, z1, 1)
}

/// Like [`extrude_convex`], with the side walls split into `bands` equal
/// rings along Z.
pub fn extrude_banded(outline: &[DVec2], z0: f64, z1: f64, bands: u32) -> MeshResult<Mesh> {
    if outline.len() < 3 {
        return Err(MeshError::degenerate(format!(
            "prism outline needs at least 3 points, got {}",
            outline.len()
        )));
    }
    if !(z1 - z0 > 0.0) {
        return Err(MeshError::degenerate(format!(
            "prism height must be positive: {z0}..{z1}"
        )));
    }
    if signed_area(outline) <= 0.0 {
        return Err(MeshError::degenerate(
            "prism outline must be counter-clockwise",
        ));
    }
    if bands == 0 {
        return Err(MeshError::degenerate("prism needs at least one band"));
    }

    let n = outline.len();
    let rings = bands as usize + 1;
    let centroid = outline.iter().copied().sum::<DVec2>() / n as f64;
    let mut mesh = Mesh::with_capacity(rings * n + 2, 2 * n * (bands as usize + 1));

    for k in 0..rings {
        let z = if k == bands as usize {
            z1
        } else {
            z0 + (z1 - z0) * (k as f64 / bands as f64)
        };
        for p in outline {
            mesh.add_vertex(p.extend(z));
        }
    }
    let bottom_center = mesh.add_vertex(centroid.extend(z0));
    let top_center = mesh.add_vertex(centroid.extend(z1));
    let at = |ring: usize, i: usize| (ring * n + i % n) as u32;

    for i in 0..n {
        mesh.add_triangle(bottom_center, at(0, i + 1), at(0, i));
        mesh.add_triangle(top_center, at(rings - 1, i), at(rings - 1, i + 1));
        for k in 0..rings - 1 {
            let (b0, b1) = (at(k, i), at(k, i + 1));
            let (t0, t1) = (at(k + 1, i), at(k + 1, i + 1));
            mesh.add_triangle(b0, b1, t1);
            mesh.add_triangle(b0, t1, t0);
        }
    }

    Ok(mesh)
}

fn signed_area(outline: &[DVec2]) -> f64 {
    let n = outline.len();
    (0..n)
        .map(|i| outline[i].perp_dot(outline[(i + 1) % n]))
        .sum::<f64>()
        * 0.5
}

/// Closed regular prism centred on the Z axis.
pub fn create_regular_prism(circumradius: f64, sides: u32, z0: f64, z1: f64) -> MeshResult<Mesh> {
    if !(circumradius > 0.0) || sides < 3 {
        return Err(MeshError::degenerate(format!(
            "regular prism needs a positive radius and 3+ sides: r={circumradius}, sides={sides}"
        )));
    }
    extrude_convex(&regular_polygon(circumradius, sides), z0, z1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_prism() {
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
        ];
        let mesh = extrude_convex(&square, -1.0, 2.0).unwrap();
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.triangle_count(), 16);
        assert!(mesh.is_closed());
        assert_relative_eq!(mesh.volume(), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_regular_prism_volume() {
        let mesh = create_regular_prism(1.0, 6, 0.0, 1.0).unwrap();
        let hexagon_area = 1.5 * 3f64.sqrt();
        assert_relative_eq!(mesh.volume(), hexagon_area, epsilon = 1e-12);
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(max.x, 1.0);
        assert_relative_eq!(min.x, -1.0);
    }

    #[test]
    fn test_banded_prism_shares_rings() {
        let outline = regular_polygon(15.0, 64);
        let mesh = extrude_banded(&outline, -25.5, 25.5, 21).unwrap();
        assert_eq!(mesh.vertex_count(), 22 * 64 + 2);
        assert_eq!(mesh.triangle_count(), 2 * 64 + 2 * 64 * 21);
        assert!(mesh.is_closed());

        let single = extrude_convex(&outline, -25.5, 25.5).unwrap();
        assert_relative_eq!(mesh.volume(), single.volume(), max_relative = 1e-12);
        assert!(extrude_banded(&outline, 0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_clockwise_outline_rejected() {
        let mut square = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        square.reverse();
        assert!(extrude_convex(&square, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_prism_rejects_bad_height() {
        let tri = regular_polygon(1.0, 3);
        assert!(extrude_convex(&tri, 1.0, 1.0).is_err());
        assert!(extrude_convex(&tri, 0.0, f64::NAN).is_err());
        assert!(create_regular_prism(1.0, 2, 0.0, 1.0).is_err());
    }
}
