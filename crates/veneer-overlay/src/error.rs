//! Error types for overlay resolution.

use thiserror::Error;
use veneer_core::SourceError;

/// Errors that can occur while resolving, merging or reading overlays.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A virtual counterpart or real entity could not be located.
    #[error("can't locate real entity for {object_id}")]
    Resolution { object_id: String },

    /// Iterating a result set or reading its metadata failed.
    #[error("data access error: {0}")]
    DataAccess(#[source] SourceError),

    /// Fetching real constraints, associations or references failed.
    #[error("metadata access error: {0}")]
    MetadataAccess(#[source] SourceError),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
