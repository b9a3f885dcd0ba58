//! Error types for the `accretion-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias. Out-of-grid lookups are not errors: they
//! return `None` and the caller treats them as a transient no-op.

/// Errors that can occur while constructing world structures.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The gas grid dimensions or cell size are unusable.
    #[error("invalid gas grid: {reason}")]
    InvalidGrid {
        /// Explanation of what is wrong with the grid parameters.
        reason: String,
    },

    /// The world bounds are not a positive, finite rectangle.
    #[error("invalid world bounds {width}x{height}")]
    InvalidBounds {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
}
