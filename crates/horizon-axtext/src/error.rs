//! Error types for text navigation.
//!
//! Navigation and query operations are non-throwing on the success path:
//! they return `Result` values, and "no more movement possible" is always a
//! zero-distance success, never an error. Search misses (`find_text`,
//! `find_attribute`) are `Ok(None)`, a normal result.

use horizon_axtree::TreeId;

/// Result type alias for text navigation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during text navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A position's anchor is missing from the current tree, or its offset
    /// is outside the anchor's current bounds. Recoverable: callers repair
    /// such positions through the validation layer instead of reading out
    /// of bounds.
    #[error("invalid position: {reason}")]
    InvalidPosition { reason: String },

    /// The tree a position or range was created against has been torn down
    /// entirely. Unlike `InvalidPosition`, there is nothing left to repair
    /// against.
    #[error("{tree} is no longer available")]
    ElementNotAvailable { tree: TreeId },

    /// The operation is not defined for its operand, e.g. comparing
    /// positions from unrelated documents.
    #[error("invalid operation: {what}")]
    InvalidOperation { what: String },
}

impl Error {
    /// Creates an `InvalidPosition` error.
    pub fn invalid_position(reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            reason: reason.into(),
        }
    }

    /// Creates an `ElementNotAvailable` error.
    pub fn element_not_available(tree: TreeId) -> Self {
        Self::ElementNotAvailable { tree }
    }

    /// Creates an `InvalidOperation` error.
    pub fn invalid_operation(what: impl Into<String>) -> Self {
        Self::InvalidOperation { what: what.into() }
    }
}
