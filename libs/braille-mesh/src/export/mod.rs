//! # Mesh Export
//!
//! STL serialization and download naming.

mod filename;
mod stl;

pub use filename::download_filename;
pub use stl::{facets, write_ascii_stl, write_binary_stl, write_stl, Facet, StlFormat};
