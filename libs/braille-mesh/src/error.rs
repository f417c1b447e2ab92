//! # Mesh Errors
//!
//! Error types for plate generation.

use thiserror::Error;

/// Errors that can occur while generating a braille plate.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A plate parameter was NaN or infinite
    #[error("Non-finite parameter '{name}': {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },

    /// Invalid mesh topology
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// Degenerate geometry
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Boolean operation failed
    #[error("Boolean operation '{operation}' failed: {message}")]
    BooleanFailed {
        operation: &'static str,
        message: String,
    },

    /// The build was cancelled by the caller
    #[error("Generation cancelled")]
    Cancelled,

    /// Writing the mesh failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh cannot be written in the requested format
    #[error("Serialization failed: {message}")]
    Serialize { message: String },

    /// Background task failed to complete
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl MeshError {
    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates a boolean operation failed error.
    pub fn boolean_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::BooleanFailed {
            operation,
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }

    /// Creates a non-finite parameter error.
    pub fn non_finite(name: &'static str, value: f64) -> Self {
        Self::NonFiniteParameter { name, value }
    }
}

/// Result alias used throughout the crate.
pub type MeshResult<T> = Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::boolean_failed("union", "empty result");
        assert_eq!(
            err.to_string(),
            "Boolean operation 'union' failed: empty result"
        );

        let err = MeshError::non_finite("card.width", f64::NAN);
        assert!(err.to_string().contains("card.width"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshError>();
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: MeshError = io.into();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
