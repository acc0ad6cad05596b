//! Error types for the spatial index

use thiserror::Error;

use crate::element::ElementId;
use crate::index::IndexState;

/// Spatial index errors
///
/// Every variant is a caller sequencing mistake; none of them is raised for
/// geometric edge cases, which surface as "no hit" instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpatialError {
    /// Operation called in a lifecycle state that does not allow it
    #[error("`{operation}` is not valid while the index is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: IndexState,
    },

    /// Normal/UV lookup without a hit from the most recent ray query
    #[error("`{operation}` requires a successful `vector_intersect` first")]
    NoRecentHit { operation: &'static str },

    /// Element id that does not belong to this index
    #[error("Element not found in index: {0:?}")]
    UnknownElement(ElementId),
}

impl SpatialError {
    /// Whether this error is a lifecycle/sequencing violation
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. } | Self::NoRecentHit { .. })
    }
}

/// Result type for spatial index operations
pub type Result<T> = std::result::Result<T, SpatialError>;
