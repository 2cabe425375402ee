//! Error types for the nugeom library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for geometry and event-generation operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Geometry description is structurally invalid
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A resolved volume carries no material information
    #[error("No material behind {0}")]
    MissingMaterial(String),

    /// Requested isotope is not part of the registered set
    #[error("Isotope {0} is not registered in this geometry")]
    UnknownIsotope(i32),

    /// Direction vector too short to normalize
    #[error("Degenerate ray direction (length {0:.3e})")]
    DegenerateDirection(f64),

    /// Traversal exceeded its crossing cap without leaving the geometry
    #[error("Ray march exceeded {0} boundary crossings")]
    MarchOverrun(usize),

    /// Unrecognized unit name
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Invalid data structure in an input file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Flux driver configuration problem
    #[error("Invalid flux: {0}")]
    InvalidFlux(String),

    /// Event generation gave up after too many attempts
    #[error("No interaction generated after {0} flux neutrinos")]
    GenerationStalled(usize),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type alias for nugeom operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::MarchOverrun(100);
        assert!(e.to_string().contains("100"));

        let e = Error::MissingMaterial("Target".to_string());
        assert!(e.to_string().contains("Target"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
