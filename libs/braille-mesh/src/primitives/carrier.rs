//! # Carrier Solids
//!
//! Base solids that features are added to or carved from.
//!
//! - Flat: box `[0, width] × [0, height] × [0, thickness]`, tiled
//! - Cylinder: faceted prism centred on the origin, `z ∈ [−h/2, h/2]`, its
//!   walls banded along the axis
//! - Bore: regular prism overshooting both cylinder ends
//!
//! Carrier surfaces are tiled at [`CARRIER_TILE`] so each feature only
//! splits the few tiles under its footprint.

use config::constants::{BORE_OVERSHOOT, CARRIER_TILE};
use glam::DVec3;

use crate::error::MeshResult;
use crate::mesh::Mesh;
use crate::spec::{BoreSpec, CylinderSpec, FlatSpec, Resolution};

use super::cuboid::create_tiled_box;
use super::prism::{create_regular_prism, extrude_banded, regular_polygon};

/// Flat card carrier.
pub fn flat_carrier(flat: &FlatSpec) -> MeshResult<Mesh> {
    create_tiled_box(
        DVec3::ZERO,
        DVec3::new(flat.width, flat.height, flat.thickness),
        CARRIER_TILE,
    )
}

/// Solid cylinder carrier, faceted according to `resolution`.
pub fn cylinder_carrier(cyl: &CylinderSpec, resolution: &Resolution) -> MeshResult<Mesh> {
    let half = cyl.height * 0.5;
    let outline = regular_polygon(cyl.radius(), resolution.facets(cyl.radius()));
    let bands = (cyl.height / CARRIER_TILE).ceil().max(1.0) as u32;
    extrude_banded(&outline, -half, half, bands)
}

/// Axial bore prism for a cylinder of the given height.
pub fn bore_prism(bore: &BoreSpec, carrier_height: f64) -> MeshResult<Mesh> {
    let half = carrier_height * 0.5 + BORE_OVERSHOOT;
    create_regular_prism(bore.circumscribed_radius(), bore.sides, -half, half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_carrier_spans_card() {
        let mesh = flat_carrier(&FlatSpec::default()).unwrap();
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, DVec3::ZERO);
        assert_eq!(max, DVec3::new(90.0, 52.0, 2.0));
        assert!(mesh.is_closed());
        // Top face alone: 36 × 21 tiles
        assert!(mesh.triangle_count() > 2 * 36 * 21);
    }

    #[test]
    fn test_cylinder_carrier_centered() {
        let cyl = CylinderSpec::default();
        let mesh = cylinder_carrier(&cyl, &Resolution::default()).unwrap();
        assert!(mesh.is_closed());
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.z, -25.5);
        assert_relative_eq!(max.z, 25.5);
        assert_relative_eq!(max.x, cyl.radius(), epsilon = 1e-12);

        let longest_wall_edge = mesh
            .iter_triangles()
            .filter(|[a, b, c]| a.z != b.z || b.z != c.z)
            .flat_map(|[a, b, c]| [(a - b).z.abs(), (b - c).z.abs(), (c - a).z.abs()])
            .fold(0.0, f64::max);
        assert!(longest_wall_edge <= CARRIER_TILE);
    }

    #[test]
    fn test_bore_overshoots_both_ends() {
        let bore = BoreSpec::default();
        let mesh = bore_prism(&bore, 51.0).unwrap();
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(max.z, 26.5);
        assert_relative_eq!(min.z, -26.5);
        // Flats at the inscribed radius
        let hexagon_area = 6.0 * bore.inscribed_radius.powi(2) * (std::f64::consts::PI / 6.0).tan();
        assert_relative_eq!(mesh.volume(), hexagon_area * 53.0, max_relative = 1e-12);
    }
}
