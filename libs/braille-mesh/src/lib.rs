//! # Braille Mesh
//!
//! Procedural geometry for 3D-printable braille plates: flat cards and
//! cylindrical shells with raised dots, or counter plates with matching
//! recesses.
//!
//! ## Architecture
//!
//! ```text
//! cell → layout → surface → factory → compositor → export
//!                                         ↑
//!                                 ops (BSP kernel + repair)
//! ```
//!
//! - **cell**: braille character → six-dot pattern
//! - **layout**: plate-space positions of dots, row indicators and bores
//! - **surface**: plate-space → carrier-space poses (flat or cylinder)
//! - **factory**: primitive solids for each feature
//! - **compositor**: balanced-tree CSG with jitter and degraded fallback
//! - **export**: STL writers and download names
//!
//! [`pipeline`] runs the whole chain synchronously; [`service`] wraps it
//! with async translation and cancellation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use braille_mesh::export::{write_stl, StlFormat};
//! use braille_mesh::pipeline::generate_default;
//! use braille_mesh::spec::PlateSpec;
//!
//! let result = generate_default(&PlateSpec::default(), &["⠓⠑⠇⠇⠕"])?;
//! let mut bytes = Vec::new();
//! write_stl(&mut bytes, &result.mesh, StlFormat::Binary, "hello")?;
//! # Ok::<(), braille_mesh::MeshError>(())
//! ```

pub mod cell;
pub mod compositor;
pub mod error;
pub mod export;
pub mod factory;
pub mod layout;
pub mod mesh;
pub mod ops;
pub mod pipeline;
pub mod primitives;
pub mod service;
pub mod spec;
pub mod surface;
pub mod timing;
pub mod translate;

pub use cell::DotPattern;
pub use compositor::{Compositor, CompositorConfig};
pub use error::{MeshError, MeshResult};
pub use mesh::Mesh;
pub use pipeline::{generate, CompositeResult, Diagnostics};
pub use spec::{CarrierKind, CounterFill, PlateMode, PlateSpec};
