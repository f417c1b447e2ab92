//! # Config Crate
//!
//! Centralized configuration constants for the braille plate pipeline.
//!
//! Every default and tolerance used by the geometry crates lives here so the
//! layout engine, solid factory and boolean kernel agree on the same values.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_CELL_PITCH, WELD_TOLERANCE};
//!
//! assert!(DEFAULT_CELL_PITCH > 0.0);
//! assert!(WELD_TOLERANCE > 0.0);
//! ```

pub mod constants;

#[cfg(test)]
mod tests;
