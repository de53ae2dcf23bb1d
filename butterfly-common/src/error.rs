//! Error types for the butterfly-osm toolkit
//!
//! Construction failures (malformed grids, bad configuration) are errors.
//! An unreachable target is a normal query outcome and never shows up here.

use thiserror::Error;

/// Main error type for butterfly-osm operations
#[derive(Debug, Error)]
pub enum Error {
    /// Grid has a zero dimension
    #[error("Grid must be non-empty, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    /// Row-major input whose rows do not all have the same length
    #[error("Grid is not rectangular: row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by the shape of the input grid
    pub fn is_grid_error(&self) -> bool {
        matches!(self, Error::EmptyGrid { .. } | Error::RaggedGrid { .. })
    }
}

/// Convenience result type for butterfly-osm operations
pub type Result<T> = std::result::Result<T, Error>;
