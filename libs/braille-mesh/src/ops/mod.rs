//! # Mesh Operations
//!
//! Boolean operations (CSG) and the repair passes that keep their output
//! closed.

pub mod boolean;
pub mod repair;

pub use boolean::{BooleanKernel, BoundingBox, BspKernel};
