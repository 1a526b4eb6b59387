//! Stable identities for objects in a data source's schema tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a data source connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSourceId(String);

impl DataSourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataSourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Fully qualified identity of a schema object.
///
/// The path runs from the outermost container down to the object itself,
/// e.g. `["sales", "public", "orders"]` for a table in a catalog and schema.
/// An empty path denotes the data source root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    data_source: DataSourceId,
    path: Vec<String>,
}

impl ObjectId {
    pub fn new<I, S>(data_source: DataSourceId, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data_source,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Identity of the data source root itself.
    pub fn root(data_source: DataSourceId) -> Self {
        Self {
            data_source,
            path: Vec::new(),
        }
    }

    pub fn data_source(&self) -> &DataSourceId {
        &self.data_source
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The object's own (last path segment) name.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The enclosing object, or `None` for the data source root.
    pub fn parent(&self) -> Option<ObjectId> {
        if self.path.is_empty() {
            return None;
        }
        Some(Self {
            data_source: self.data_source.clone(),
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, name: impl Into<String>) -> ObjectId {
        let mut path = self.path.clone();
        path.push(name.into());
        Self {
            data_source: self.data_source.clone(),
            path,
        }
    }

    /// Enclosing containers from the innermost outwards, excluding the root.
    pub fn ancestors(&self) -> impl Iterator<Item = ObjectId> + '_ {
        (1..self.path.len()).rev().map(move |len| Self {
            data_source: self.data_source.clone(),
            path: self.path[..len].to_vec(),
        })
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.data_source, self.path.join("."))
    }
}
