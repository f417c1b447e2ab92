//! # Row Indicators
//!
//! Prism markers at both ends of every row. A triangle pointing in the
//! row-advance direction (+X) marks the start, a rectangle marks the end.
//!
//! Outlines are in the cell frame: origin at the cell center, X along the
//! row, Y up the plate.

use glam::DVec2;

use crate::error::MeshResult;
use crate::mesh::Mesh;
use crate::spec::PlateSpec;

use super::prism::extrude_convex;

/// Start-of-row triangle: vertical base on the left dot column, apex at the
/// right dot column.
pub fn start_outline(spec: &PlateSpec) -> Vec<DVec2> {
    let half_pitch = spec.spacing.dot_pitch * 0.5;
    let half_span = spec.spacing.dot_pitch + spec.dot.base_diameter * 0.5;
    vec![
        DVec2::new(-half_pitch, -half_span),
        DVec2::new(half_pitch, 0.0),
        DVec2::new(-half_pitch, half_span),
    ]
}

/// End-of-row rectangle covering the dot columns of one cell.
pub fn end_outline(spec: &PlateSpec) -> Vec<DVec2> {
    let half_width = spec.spacing.dot_pitch * 0.5;
    let half_height = spec.spacing.dot_pitch + spec.dot.base_diameter * 0.5;
    vec![
        DVec2::new(-half_width, -half_height),
        DVec2::new(half_width, -half_height),
        DVec2::new(half_width, half_height),
        DVec2::new(-half_width, half_height),
    ]
}

/// Raised marker: from `embed` below the surface up to full dot height.
pub fn raised_indicator(outline: &[DVec2], spec: &PlateSpec, embed: f64) -> MeshResult<Mesh> {
    extrude_convex(outline, -embed, spec.dot.total_height())
}

/// Recessed marker, floor at z = 0, reaching `embed` past the surface
/// at `z = indicator_depth`.
pub fn recessed_indicator(outline: &[DVec2], spec: &PlateSpec, embed: f64) -> MeshResult<Mesh> {
    extrude_convex(outline, 0.0, spec.indicator_depth + embed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_start_triangle_points_forward() {
        let spec = PlateSpec::default();
        let outline = start_outline(&spec);
        let apex = outline
            .iter()
            .copied()
            .max_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap();
        assert_relative_eq!(apex.x, spec.spacing.dot_pitch * 0.5);
        assert_relative_eq!(apex.y, 0.0);
        // Base edge is vertical
        assert_relative_eq!(outline[0].x, outline[2].x);
    }

    #[test]
    fn test_end_rectangle_size() {
        let spec = PlateSpec::default();
        let mesh = recessed_indicator(&end_outline(&spec), &spec, 0.2).unwrap();
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(max.x - min.x, 2.5);
        assert_relative_eq!(max.y - min.y, 2.0 * 2.5 + 1.8, epsilon = 1e-12);
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_raised_indicator_height() {
        let spec = PlateSpec::default();
        let mesh = raised_indicator(&start_outline(&spec), &spec, 0.2).unwrap();
        assert!(mesh.is_closed());
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.z, -0.2);
        assert_relative_eq!(max.z, spec.dot.total_height());
    }

    #[test]
    fn test_triangle_and_rectangle_differ_by_touch() {
        let spec = PlateSpec::default();
        let tri = recessed_indicator(&start_outline(&spec), &spec, 0.2).unwrap();
        let rect = recessed_indicator(&end_outline(&spec), &spec, 0.2).unwrap();
        assert_relative_eq!(tri.volume() * 2.0, rect.volume(), max_relative = 1e-12);
    }
}
