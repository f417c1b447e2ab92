//! # Mesh Data Structure
//!
//! Indexed triangle mesh plus the topology and volume queries used to check
//! that composed plates are printable.

use std::collections::HashMap;

use config::constants::DEGENERATE_AREA;
use glam::{DAffine3, DVec3};

/// A triangle mesh with vertices and indices.
///
/// All geometry calculations use f64. Conversion to f32 happens only in the
/// STL serializer.
///
/// # Example
///
/// ```rust
/// use braille_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices, counter-clockwise seen from outside
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Builds a mesh from raw buffers.
    pub fn from_parts(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Consumes the mesh and returns its buffers.
    pub fn into_parts(self) -> (Vec<DVec3>, Vec<[u32; 3]>) {
        (self.vertices, self.triangles)
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Iterates over triangle corner positions.
    pub fn iter_triangles(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.triangles.iter().map(move |&[a, b, c]| {
            [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            ]
        })
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        self.vertices[1..]
            .iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Applies a rigid (or any affine) transform to every vertex.
    ///
    /// Transforms with a negative determinant flip the triangle winding back
    /// so the mesh stays outward-facing.
    pub fn transform(&mut self, transform: &DAffine3) {
        for v in &mut self.vertices {
            *v = transform.transform_point3(*v);
        }
        if transform.matrix3.determinant() < 0.0 {
            self.flip();
        }
    }

    /// Translates the mesh by a vector.
    pub fn translate(&mut self, offset: DVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Reverses the winding of every triangle.
    pub fn flip(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
    }

    /// Merges another mesh into this one without welding.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );
    }

    /// Returns true if all vertex coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| v.is_finite())
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No triangle repeats an index
    /// - No zero-area triangles
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.triangles.iter().all(|tri| {
            if tri.iter().any(|&i| i >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            let [v0, v1, v2] = [self.vertex(tri[0]), self.vertex(tri[1]), self.vertex(tri[2])];
            (v1 - v0).cross(v2 - v0).length() >= DEGENERATE_AREA
        })
    }

    /// Signed volume enclosed by the mesh (divergence theorem).
    ///
    /// Positive for a closed, outward-wound mesh.
    pub fn volume(&self) -> f64 {
        self.iter_triangles()
            .map(|[a, b, c]| a.dot(b.cross(c)))
            .sum::<f64>()
            / 6.0
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.iter_triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).length() * 0.5)
            .sum()
    }

    /// Counts directed edges with no matching reverse edge.
    ///
    /// Zero for a closed, consistently oriented mesh.
    pub fn boundary_edge_count(&self) -> usize {
        let edges = self.directed_edges();
        edges
            .iter()
            .map(|(&(a, b), &count)| {
                let reverse = edges.get(&(b, a)).copied().unwrap_or(0);
                count.abs_diff(reverse)
            })
            .sum()
    }

    /// Returns true if every undirected edge is used by exactly two
    /// triangles with opposite orientation.
    ///
    /// An empty mesh is trivially closed.
    pub fn is_closed(&self) -> bool {
        let edges = self.directed_edges();
        edges
            .iter()
            .all(|(&(a, b), &count)| count == 1 && edges.get(&(b, a)) == Some(&1))
    }

    fn directed_edges(&self) -> HashMap<(u32, u32), usize> {
        let mut edges = HashMap::with_capacity(self.triangles.len() * 3);
        for tri in &self.triangles {
            for i in 0..3 {
                *edges.entry((tri[i], tri[(i + 1) % 3])).or_insert(0) += 1;
            }
        }
        edges
    }
}
