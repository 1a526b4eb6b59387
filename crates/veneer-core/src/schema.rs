//! Schema-layer contracts.
//!
//! These types describe the real metadata tree discovered from a data source.
//! Implementations may need I/O to answer, so every metadata read is fallible
//! and receives the caller's progress monitor.

use crate::error::SourceError;
use crate::identity::{DataSourceId, ObjectId};
use crate::progress::ProgressMonitor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Coarse value category of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Boolean,
    Numeric,
    #[default]
    String,
    Datetime,
    Binary,
    Structure,
}

impl DataKind {
    /// Derive the category from a native SQL type name.
    pub fn from_type_name(type_name: &str) -> Self {
        let dt = type_name.trim().to_lowercase();

        // Array element types never decide the kind.
        if dt.ends_with("[]") || dt.starts_with('_') || dt.contains("array") {
            return DataKind::Structure;
        }

        // Type name without modifiers: "numeric(10,2)" -> "numeric".
        let base = dt.split('(').next().unwrap_or_default().trim();
        let first = base.split_whitespace().next().unwrap_or_default();

        if base.contains("bool") {
            DataKind::Boolean
        } else if is_integer_type(first)
            || matches!(first, "numeric" | "decimal" | "real" | "money" | "number")
            || base.starts_with("float")
            || base.starts_with("double")
        {
            DataKind::Numeric
        } else if base.contains("date") || base.contains("time") || first == "interval" {
            DataKind::Datetime
        } else if base.contains("bytea") || base.contains("blob") || base.contains("binary") {
            DataKind::Binary
        } else if base.contains("json")
            || matches!(
                first,
                "point" | "line" | "lseg" | "box" | "path" | "polygon" | "circle" | "geometry"
            )
        {
            DataKind::Structure
        } else {
            // text, varchar, char, uuid, enum labels, etc.
            DataKind::String
        }
    }
}

fn is_integer_type(name: &str) -> bool {
    matches!(
        name,
        "int"
            | "int2"
            | "int4"
            | "int8"
            | "integer"
            | "smallint"
            | "bigint"
            | "tinyint"
            | "mediumint"
            | "serial"
            | "serial2"
            | "serial4"
            | "serial8"
            | "smallserial"
            | "bigserial"
    )
}

/// Metadata of an entity attribute or of a result-set column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMeta {
    /// Column name.
    pub name: String,

    /// Native SQL data type.
    #[serde(alias = "data_type")]
    pub type_name: String,

    /// Value category; derived from `type_name` when omitted.
    #[serde(default)]
    pub kind: Option<DataKind>,

    /// Zero-based position in the owning entity or result set.
    #[serde(default)]
    pub ordinal: usize,

    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl AttributeMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            kind: Some(DataKind::from_type_name(&type_name)),
            type_name,
            ordinal: 0,
            nullable: true,
        }
    }

    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn data_kind(&self) -> DataKind {
        self.kind
            .unwrap_or_else(|| DataKind::from_type_name(&self.type_name))
    }
}

fn default_nullable() -> bool {
    true
}

/// Kind of a unique or check constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    UniqueKey,
    Check,
}

/// A constraint declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl Constraint {
    pub fn new<I, S>(name: impl Into<String>, kind: ConstraintKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single column mapping of an association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    /// Column of the referencing entity.
    pub column: String,
    /// Column of the referenced entity.
    pub referenced_column: String,
}

/// A foreign-key style association from `owner` to `referenced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    pub owner: ObjectId,
    pub referenced: ObjectId,
    pub columns: Vec<ColumnPair>,
}

/// A table or view in the real schema tree.
pub trait SchemaEntity: Send + Sync + fmt::Debug {
    /// Stable identity of the entity within its data source.
    fn id(&self) -> &ObjectId;

    fn name(&self) -> &str {
        self.id().name()
    }

    fn data_source(&self) -> &DataSourceId {
        self.id().data_source()
    }

    fn attributes(&self, monitor: &dyn ProgressMonitor) -> Result<Vec<AttributeMeta>, SourceError>;

    fn constraints(&self, monitor: &dyn ProgressMonitor) -> Result<Vec<Constraint>, SourceError>;

    /// Associations owned by this entity (outgoing foreign keys).
    fn associations(&self, monitor: &dyn ProgressMonitor)
    -> Result<Vec<Association>, SourceError>;

    /// Associations of other entities that point at this one.
    fn references(&self, monitor: &dyn ProgressMonitor) -> Result<Vec<Association>, SourceError>;
}

/// Entity lookup by identity within one data source.
pub trait SchemaCatalog: Send + Sync {
    fn find_entity(
        &self,
        id: &ObjectId,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Option<Arc<dyn SchemaEntity>>, SourceError>;
}

/// A source of rows without a stable schema identity, e.g. an ad-hoc query.
pub trait DataContainer: Send + Sync + fmt::Debug {
    fn data_source(&self) -> &DataSourceId;

    /// Display name of the container.
    fn name(&self) -> &str;

    /// Short tag naming the container type.
    fn kind(&self) -> &str {
        "query"
    }

    /// Text that identifies the container within its data source.
    fn identity_text(&self) -> &str;
}

/// A custom SQL query used as a data container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContainer {
    data_source: DataSourceId,
    name: String,
    query: String,
}

impl QueryContainer {
    pub fn new(
        data_source: DataSourceId,
        name: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            data_source,
            name: name.into(),
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl DataContainer for QueryContainer {
    fn data_source(&self) -> &DataSourceId {
        &self.data_source
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn identity_text(&self) -> &str {
        &self.query
    }
}
