//! In-memory schema layer built from a schema snapshot.
//!
//! The snapshot format mirrors what an introspection pass produces: tables with
//! their columns, constraints and foreign keys. A [`SnapshotCatalog`] serves the
//! snapshot through the schema-layer traits, so overlays can be resolved and
//! merged without a live connection.

use crate::error::SourceError;
use crate::identity::{DataSourceId, ObjectId};
use crate::progress::ProgressMonitor;
use crate::schema::{
    Association, AttributeMeta, ColumnPair, Constraint, SchemaCatalog, SchemaEntity,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Snapshot of one data source's schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub data_source: DataSourceId,
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
}

/// Snapshot of one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Enclosing container path (catalog, schema); may be empty.
    #[serde(default)]
    pub container: Vec<String>,

    pub name: String,

    #[serde(default)]
    pub columns: Vec<AttributeMeta>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeySnapshot>,
}

impl TableSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            container: Vec::new(),
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn in_container<I, S>(mut self, container: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.container = container.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_column(mut self, column: AttributeMeta) -> Self {
        let ordinal = self.columns.len();
        self.columns.push(column.with_ordinal(ordinal));
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_foreign_key(mut self, fk: ForeignKeySnapshot) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    fn object_id(&self, data_source: &DataSourceId) -> ObjectId {
        ObjectId::new(
            data_source.clone(),
            self.container.iter().cloned().chain(std::iter::once(self.name.clone())),
        )
    }
}

/// Snapshot of a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeySnapshot {
    pub name: String,

    /// Referenced table container path; defaults to the owning table's.
    #[serde(default)]
    pub referenced_container: Option<Vec<String>>,

    pub referenced_table: String,

    pub columns: Vec<ColumnPair>,
}

/// A table served from a snapshot.
#[derive(Debug)]
pub struct SnapshotEntity {
    id: ObjectId,
    attributes: Vec<AttributeMeta>,
    constraints: Vec<Constraint>,
    associations: Vec<Association>,
    references: Vec<Association>,
}

impl SchemaEntity for SnapshotEntity {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn attributes(
        &self,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<AttributeMeta>, SourceError> {
        Ok(self.attributes.clone())
    }

    fn constraints(&self, _monitor: &dyn ProgressMonitor) -> Result<Vec<Constraint>, SourceError> {
        Ok(self.constraints.clone())
    }

    fn associations(
        &self,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<Association>, SourceError> {
        Ok(self.associations.clone())
    }

    fn references(&self, _monitor: &dyn ProgressMonitor) -> Result<Vec<Association>, SourceError> {
        Ok(self.references.clone())
    }
}

/// Catalog serving the tables of one [`SchemaSnapshot`].
#[derive(Debug)]
pub struct SnapshotCatalog {
    data_source: DataSourceId,
    /// Entities in snapshot order.
    entities: Vec<Arc<SnapshotEntity>>,
    by_id: HashMap<ObjectId, usize>,
}

impl SnapshotCatalog {
    /// Build the catalog, resolving foreign keys into associations and
    /// deriving each table's incoming references.
    pub fn new(snapshot: SchemaSnapshot) -> Result<Self, SourceError> {
        let data_source = snapshot.data_source;
        let mut by_id = HashMap::new();
        for (index, table) in snapshot.tables.iter().enumerate() {
            let id = table.object_id(&data_source);
            if by_id.insert(id.clone(), index).is_some() {
                return Err(SourceError::Catalog(format!("duplicate table {}", id)));
            }
        }

        let mut outgoing: Vec<Vec<Association>> = vec![Vec::new(); snapshot.tables.len()];
        let mut incoming: Vec<Vec<Association>> = vec![Vec::new(); snapshot.tables.len()];
        for (index, table) in snapshot.tables.iter().enumerate() {
            let owner = table.object_id(&data_source);
            for fk in &table.foreign_keys {
                let container = fk
                    .referenced_container
                    .clone()
                    .unwrap_or_else(|| table.container.clone());
                let referenced = ObjectId::new(
                    data_source.clone(),
                    container.into_iter().chain(std::iter::once(fk.referenced_table.clone())),
                );
                let target = *by_id.get(&referenced).ok_or_else(|| {
                    SourceError::Catalog(format!(
                        "foreign key {} of {} references unknown table {}",
                        fk.name, owner, referenced
                    ))
                })?;

                let association = Association {
                    name: fk.name.clone(),
                    owner: owner.clone(),
                    referenced,
                    columns: fk.columns.clone(),
                };
                outgoing[index].push(association.clone());
                incoming[target].push(association);
            }
        }

        let entities: Vec<Arc<SnapshotEntity>> = snapshot
            .tables
            .into_iter()
            .zip(outgoing.into_iter().zip(incoming))
            .map(|(table, (associations, references))| {
                Arc::new(SnapshotEntity {
                    id: table.object_id(&data_source),
                    attributes: table.columns,
                    constraints: table.constraints,
                    associations,
                    references,
                })
            })
            .collect();

        tracing::debug!(
            data_source = %data_source,
            tables = entities.len(),
            "Built schema snapshot catalog"
        );

        Ok(Self {
            data_source,
            entities,
            by_id,
        })
    }

    /// Parse a JSON snapshot and build the catalog from it.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let snapshot: SchemaSnapshot =
            serde_json::from_str(json).map_err(|e| SourceError::Catalog(e.to_string()))?;
        Self::new(snapshot)
    }

    pub fn data_source(&self) -> &DataSourceId {
        &self.data_source
    }

    /// Entity by identity, without going through the trait object.
    pub fn entity(&self, id: &ObjectId) -> Option<Arc<SnapshotEntity>> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.entities[i]))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<SnapshotEntity>> {
        self.entities.iter()
    }
}

impl SchemaCatalog for SnapshotCatalog {
    fn find_entity(
        &self,
        id: &ObjectId,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<Option<Arc<dyn SchemaEntity>>, SourceError> {
        Ok(self.entity(id).map(|e| e as Arc<dyn SchemaEntity>))
    }
}
