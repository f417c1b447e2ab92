//! STL writers.
//!
//! Facet normals are recomputed from the winding rather than stored, and
//! triangles with (near) zero area are left out so slicers never see a
//! zero-length normal.

use std::io::Write;

use config::constants::DEGENERATE_AREA;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// STL flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

/// One output triangle with its unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: DVec3,
    pub vertices: [DVec3; 3],
}

/// Facets of `mesh` in triangle order, degenerate triangles skipped.
///
/// # Errors
///
/// Returns [`MeshError::Serialize`] if any vertex is NaN or infinite.
pub fn facets(mesh: &Mesh) -> MeshResult<Vec<Facet>> {
    if !mesh.is_finite() {
        return Err(MeshError::serialize("mesh has non-finite vertices"));
    }
    Ok(mesh
        .iter_triangles()
        .filter_map(|[a, b, c]| {
            let cross = (b - a).cross(c - a);
            (cross.length() * 0.5 >= DEGENERATE_AREA).then(|| Facet {
                normal: cross.normalize(),
                vertices: [a, b, c],
            })
        })
        .collect())
}

/// Writes `mesh` in the given format. Returns the number of facets written.
pub fn write_stl<W: Write>(
    writer: &mut W,
    mesh: &Mesh,
    format: StlFormat,
    name: &str,
) -> MeshResult<usize> {
    match format {
        StlFormat::Ascii => write_ascii_stl(writer, mesh, name),
        StlFormat::Binary => write_binary_stl(writer, mesh),
    }
}

/// Writes an ASCII STL `solid <name> … endsolid <name>`.
pub fn write_ascii_stl<W: Write>(writer: &mut W, mesh: &Mesh, name: &str) -> MeshResult<usize> {
    let facets = facets(mesh)?;
    let name = solid_name(name);

    writeln!(writer, "solid {name}")?;
    for facet in &facets {
        let n = facet.normal;
        writeln!(writer, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in &facet.vertices {
            writeln!(writer, "      vertex {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;

    debug!(facets = facets.len(), format = "ascii", "stl written");
    Ok(facets.len())
}

/// Writes a binary STL through `stl_io`.
pub fn write_binary_stl<W: Write>(writer: &mut W, mesh: &Mesh) -> MeshResult<usize> {
    let facets = facets(mesh)?;
    let triangles: Vec<stl_io::Triangle> = facets
        .iter()
        .map(|facet| stl_io::Triangle {
            normal: stl_io::Normal::new(facet.normal.as_vec3().to_array()),
            vertices: facet
                .vertices
                .map(|v| stl_io::Vertex::new(v.as_vec3().to_array())),
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())?;
    debug!(facets = triangles.len(), format = "binary", "stl written");
    Ok(triangles.len())
}

/// A single whitespace-free token; STL readers split the header on spaces.
fn solid_name(name: &str) -> String {
    let name: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if name.is_empty() {
        "braille".to_string()
    } else {
        name
    }
}
