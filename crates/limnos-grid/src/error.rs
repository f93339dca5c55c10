//! Error types for grid construction.

use thiserror::Error;

/// Errors arising from grid construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Attempted to construct a grid with zero cells.
    #[error("grid must have at least one cell")]
    EmptyGrid,
    /// The total cell count does not fit in `usize`.
    #[error("grid dimension '{name}' of {value} overflows the cell count")]
    DimensionTooLarge {
        /// Name of the offending dimension.
        name: String,
        /// The requested length.
        value: usize,
    },
    /// Coordinate labels are unusable for a dimension.
    #[error("invalid coordinates for dimension '{name}': {reason}")]
    InvalidCoordinates {
        /// Name of the offending dimension.
        name: String,
        /// What went wrong.
        reason: String,
    },
}
