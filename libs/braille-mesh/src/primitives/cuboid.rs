//! # Box Primitive
//!
//! Axis-aligned rectangular prisms. The flat card carrier uses the tiled
//! variant so that features only split the tiles under them.

use std::collections::HashMap;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use glam::DVec3;

/// Creates an axis-aligned box spanning `min..max`.
///
/// # Returns
///
/// A mesh with 8 vertices and 12 triangles (2 per face).
///
/// # Example
///
/// ```rust
/// use braille_mesh::primitives::create_box;
/// use glam::DVec3;
///
/// let mesh = create_box(DVec3::ZERO, DVec3::new(90.0, 52.0, 2.0)).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// ```
pub fn create_box(min: DVec3, max: DVec3) -> MeshResult<Mesh> {
    check_extent(min, max)?;

    let mut mesh = Mesh::with_capacity(8, 12);

    // Bottom corners (z = min.z)
    let v0 = mesh.add_vertex(DVec3::new(min.x, min.y, min.z));
    let v1 = mesh.add_vertex(DVec3::new(max.x, min.y, min.z));
    let v2 = mesh.add_vertex(DVec3::new(max.x, max.y, min.z));
    let v3 = mesh.add_vertex(DVec3::new(min.x, max.y, min.z));

    // Top corners (z = max.z)
    let v4 = mesh.add_vertex(DVec3::new(min.x, min.y, max.z));
    let v5 = mesh.add_vertex(DVec3::new(max.x, min.y, max.z));
    let v6 = mesh.add_vertex(DVec3::new(max.x, max.y, max.z));
    let v7 = mesh.add_vertex(DVec3::new(min.x, max.y, max.z));

    // Counter-clockwise seen from outside

    // Bottom
    mesh.add_triangle(v0, v2, v1);
    mesh.add_triangle(v0, v3, v2);

    // Top
    mesh.add_triangle(v4, v5, v6);
    mesh.add_triangle(v4, v6, v7);

    // Front (y = min.y)
    mesh.add_triangle(v0, v1, v5);
    mesh.add_triangle(v0, v5, v4);

    // Back (y = max.y)
    mesh.add_triangle(v2, v3, v7);
    mesh.add_triangle(v2, v7, v6);

    // Left (x = min.x)
    mesh.add_triangle(v3, v0, v4);
    mesh.add_triangle(v3, v4, v7);

    // Right (x = max.x)
    mesh.add_triangle(v1, v2, v6);
    mesh.add_triangle(v1, v6, v5);

    Ok(mesh)
}

/// Creates an axis-aligned box whose faces are split into a grid of quads
/// no longer than `tile` on a side.
///
/// Faces share the vertices along their common borders, so the box is
/// closed. Each axis gets `ceil(extent / tile)` divisions, at least one.
pub fn create_tiled_box(min: DVec3, max: DVec3, tile: f64) -> MeshResult<Mesh> {
    check_extent(min, max)?;
    if !(tile > 0.0) || !tile.is_finite() {
        return Err(MeshError::degenerate(format!(
            "tile size must be positive: {tile}"
        )));
    }

    let divisions = ((max - min) / tile).ceil().max(DVec3::ONE);
    let n = [divisions.x as u32, divisions.y as u32, divisions.z as u32];
    let lattice = Lattice { min, max, n };
    let mut ids: HashMap<[u32; 3], u32> = HashMap::new();
    let mut mesh = Mesh::new();

    for axis in 0..3 {
        // (axis, b, c) is right-handed, so counter-clockwise in (b, c)
        // faces +axis.
        let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
        for (layer, outward) in [(0, false), (n[axis], true)] {
            for i in 0..n[b] {
                for j in 0..n[c] {
                    let mut corner = |di: u32, dj: u32| {
                        let mut ijk = [0; 3];
                        ijk[axis] = layer;
                        ijk[b] = i + di;
                        ijk[c] = j + dj;
                        *ids.entry(ijk)
                            .or_insert_with(|| mesh.add_vertex(lattice.point(ijk)))
                    };
                    let (p00, p10, p11, p01) = (corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1));
                    if outward {
                        mesh.add_triangle(p00, p10, p11);
                        mesh.add_triangle(p00, p11, p01);
                    } else {
                        mesh.add_triangle(p00, p11, p10);
                        mesh.add_triangle(p00, p01, p11);
                    }
                }
            }
        }
    }

    Ok(mesh)
}

fn check_extent(min: DVec3, max: DVec3) -> MeshResult<()> {
    let size = max - min;
    if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "box extent must be positive: {size:?}"
        )));
    }
    Ok(())
}

/// Regular grid of points spanning a box.
struct Lattice {
    min: DVec3,
    max: DVec3,
    n: [u32; 3],
}

impl Lattice {
    fn point(&self, ijk: [u32; 3]) -> DVec3 {
        let coord = |axis: usize| {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if ijk[axis] == self.n[axis] {
                hi
            } else {
                lo + (hi - lo) * (ijk[axis] as f64 / self.n[axis] as f64)
            }
        };
        DVec3::new(coord(0), coord(1), coord(2))
    }
}
