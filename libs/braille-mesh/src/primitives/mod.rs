//! # Primitives
//!
//! Mesh generators for carriers, dots, recesses and indicator prisms.
//! Every generator returns a closed, outward-wound mesh in its local frame.

pub mod carrier;
pub mod cuboid;
pub mod dot;
pub mod indicator;
pub mod prism;
pub mod revolve;

pub use carrier::{bore_prism, cylinder_carrier, flat_carrier};
pub use cuboid::{create_box, create_tiled_box};
pub use dot::{raised_dot, recess_bowl};
pub use prism::{create_regular_prism, extrude_banded, extrude_convex, regular_polygon};
pub use revolve::revolve_profile;
