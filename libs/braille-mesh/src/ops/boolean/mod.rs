//! # Boolean Operations (CSG)
//!
//! Constructive Solid Geometry operations using BSP trees.
//!
//! ## Algorithm
//!
//! Based on the csg.js algorithm by Evan Wallace:
//! - Union: A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); combine
//! - Difference: A.invert(); A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); combine; result.invert()
//!
//! `clipTo` only looks at the planes of the tree it clips against, so each
//! polygon can be clipped on its own. Both operands are first split into
//! [shells](shell) and a polygon only meets the trees of the other
//! operand's shells it overlaps. Operands with no overlapping shells skip
//! the BSP entirely.
//!
//! Raw BSP output has unshared split vertices and T-junctions, so every
//! result goes through [`crate::ops::repair::stitch`]. A result that is
//! still not closed is an error.
//!
//! ## Example
//!
//! ```rust
//! use braille_mesh::ops::boolean::{BooleanKernel, BspKernel};
//! use braille_mesh::primitives::create_box;
//! use glam::DVec3;
//!
//! let a = create_box(DVec3::ZERO, DVec3::splat(2.0)).unwrap();
//! let b = create_box(DVec3::ONE, DVec3::splat(3.0)).unwrap();
//! let merged = BspKernel::default().union(&a, &b).unwrap();
//! assert!(merged.is_closed());
//! assert!((merged.volume() - 15.0).abs() < 1e-9);
//! ```

mod bsp;
mod plane;
mod polygon;
mod shell;


use config::constants::WELD_TOLERANCE;
use glam::DVec3;
use rayon::prelude::*;
use tracing::trace;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::ops::repair::stitch;
use polygon::Polygon;
use shell::{shells, Clipper, Shell};

// =============================================================================
// KERNEL TRAIT
// =============================================================================

/// Pairwise boolean operations on closed meshes.
///
/// The compositor only talks to this trait, so the BSP kernel can be swapped
/// or wrapped (tests inject failing kernels through it).
pub trait BooleanKernel: Send + Sync {
    /// Returns `a ∪ b`.
    fn union(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh>;

    /// Returns `a − b`.
    fn difference(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh>;
}

/// BSP boolean kernel with post-boolean repair.
#[derive(Debug, Clone, Copy)]
pub struct BspKernel {
    /// Vertices closer than this are merged after each operation.
    pub weld_tolerance: f64,
}

impl Default for BspKernel {
    fn default() -> Self {
        Self {
            weld_tolerance: WELD_TOLERANCE,
        }
    }
}

impl BooleanKernel for BspKernel {
    fn union(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        if a.is_empty() {
            return Ok(b.clone());
        }
        if b.is_empty() {
            return Ok(a.clone());
        }

        let (shells_a, shells_b, clip_a, clip_b) = self.prepare(a, b);
        // No shell of one touches the other: both side by side.
        if clip_a.is_empty() {
            let mut merged = a.clone();
            merged.merge(b);
            return Ok(merged);
        }

        let mut polygons: Vec<Polygon> = into_polygons(shells_a)
            .into_par_iter()
            .flat_map_iter(|p| clip_b.outside(vec![p]))
            .collect();
        polygons.par_extend(into_polygons(shells_b).into_par_iter().flat_map_iter(|p| {
            let mut outside = clip_a.outside(vec![p]);
            flip_all(&mut outside);
            let mut outside = clip_a.outside(outside);
            flip_all(&mut outside);
            outside
        }));
        self.finish("union", polygons)
    }

    fn difference(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        if a.is_empty() {
            return Ok(Mesh::new());
        }
        if b.is_empty() {
            return Ok(a.clone());
        }

        let (shells_a, shells_b, clip_a, clip_b) = self.prepare(a, b);
        if clip_b.is_empty() {
            return Ok(a.clone());
        }

        let mut polygons: Vec<Polygon> = into_polygons(shells_a)
            .into_par_iter()
            .flat_map_iter(|mut p| {
                p.flip();
                let mut outside = clip_b.outside(vec![p]);
                flip_all(&mut outside);
                outside
            })
            .collect();
        let inside_a = clip_a.inverted();
        polygons.par_extend(
            into_polygons(shells_b)
                .into_par_iter()
                .flat_map_iter(|p| inside_a.inside_each(&p)),
        );
        self.finish("difference", polygons)
    }
}

impl BspKernel {
    /// Shells of both operands and a clipper over the overlapping ones.
    fn prepare(&self, a: &Mesh, b: &Mesh) -> (Vec<Shell>, Vec<Shell>, Clipper, Clipper) {
        let tolerance = self.weld_tolerance;
        let (shells_a, shells_b) = rayon::join(|| shells(a, tolerance), || shells(b, tolerance));
        let (clip_a, clip_b) = rayon::join(
            || Clipper::new(&shells_a, &shells_b, tolerance),
            || Clipper::new(&shells_b, &shells_a, tolerance),
        );
        trace!(
            shells_a = shells_a.len(),
            shells_b = shells_b.len(),
            "operand shells"
        );
        (shells_a, shells_b, clip_a, clip_b)
    }

    fn finish(&self, operation: &'static str, polygons: Vec<Polygon>) -> MeshResult<Mesh> {
        let rings: Vec<&[DVec3]> = polygons.iter().map(|p| p.vertices.as_slice()).collect();
        let mesh = stitch(&rings, self.weld_tolerance);
        if mesh.is_empty() {
            return Err(MeshError::boolean_failed(operation, "empty result"));
        }
        if !mesh.is_finite() {
            return Err(MeshError::boolean_failed(operation, "non-finite vertices"));
        }
        if !mesh.is_closed() {
            let open = mesh.boundary_edge_count();
            return Err(MeshError::boolean_failed(
                operation,
                format!("result not closed ({open} unmatched edges)"),
            ));
        }
        Ok(mesh)
    }
}

fn into_polygons(shells: Vec<Shell>) -> Vec<Polygon> {
    shells.into_iter().flat_map(|shell| shell.polygons).collect()
}

fn flip_all(polygons: &mut [Polygon]) {
    for polygon in polygons {
        polygon.flip();
    }
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Contains nothing; the identity for [`BoundingBox::union`].
    pub const EMPTY: BoundingBox = BoundingBox {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };

    /// Bounds of a point set.
    pub fn from_points(points: &[DVec3]) -> Self {
        points.iter().fold(Self::EMPTY, |bounds, &p| BoundingBox {
            min: bounds.min.min(p),
            max: bounds.max.max(p),
        })
    }

    /// Bounds of a mesh's vertices.
    pub fn of(mesh: &Mesh) -> Self {
        let (min, max) = mesh.bounding_box();
        Self { min, max }
    }

    /// Returns true if the boxes, grown by `tolerance`, intersect.
    pub fn overlaps(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min - tolerance).cmple(other.max).all() && (other.min - tolerance).cmple(self.max).all()
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
