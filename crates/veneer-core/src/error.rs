//! Error types reported by schema-layer collaborators.

use thiserror::Error;

/// Errors raised by the schema layer, result sets and value handlers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading entity metadata (columns, constraints, associations) failed.
    #[error("metadata read failed: {0}")]
    Metadata(String),

    /// Iterating a result set or reading its column metadata failed.
    #[error("result set read failed: {0}")]
    ResultSet(String),

    /// A single column value could not be fetched.
    #[error("failed to fetch value of column {column}: {reason}")]
    ValueFetch { column: String, reason: String },

    /// The catalog could not be queried or built.
    #[error("catalog error: {0}")]
    Catalog(String),
}
