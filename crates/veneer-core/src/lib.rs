//! # veneer-core
//!
//! Contracts shared by the Veneer crates.
//!
//! Veneer attaches user-declared ("virtual") metadata to schema objects that a
//! database tool discovers from a live data source. This crate describes the
//! collaborators the overlay layer talks to, without implementing any of them
//! against a real database:
//!
//! - Object identities ([`DataSourceId`], [`ObjectId`])
//! - The schema layer ([`SchemaEntity`], [`SchemaCatalog`], [`DataContainer`])
//! - Result sets and value handlers used when reading dictionaries
//! - Value transformer descriptors and their registry
//! - Cooperative cancellation ([`ProgressMonitor`])
//! - An in-memory schema snapshot usable as a schema layer
//! - Overlay configuration loaded from YAML

pub mod config;
pub mod error;
pub mod identity;
pub mod progress;
pub mod result;
pub mod schema;
pub mod snapshot;
pub mod transform;

pub use config::{ConfigError, DescriptionConfig, DictionaryConfig, OverlayConfig};
pub use error::SourceError;
pub use identity::{DataSourceId, ObjectId};
pub use progress::{CancelFlag, ProgressMonitor, VoidProgressMonitor};
pub use result::{
    DefaultValueHandler, DisplayFormat, MemoryResultSet, ResultSet, Session, SimpleSession,
    ValueHandler, NULL_VALUE_LABEL,
};
pub use schema::{
    Association, AttributeMeta, ColumnPair, Constraint, ConstraintKind, DataContainer, DataKind,
    QueryContainer, SchemaCatalog, SchemaEntity,
};
pub use snapshot::{
    ForeignKeySnapshot, SchemaSnapshot, SnapshotCatalog, SnapshotEntity, TableSnapshot,
};
pub use transform::{
    AttributeTransformer, StaticTransformerRegistry, TransformOptions, TransformerDefinition,
    TransformerDescriptor, TransformerRegistry,
};

/// Cell and option values exchanged with the schema layer.
pub use serde_json::Value;
