//! Merging real schema metadata with overlay declarations.
//!
//! Real entries always come first, in the order the schema layer reports
//! them; overlay entries follow in declaration order.

use crate::error::{OverlayError, Result};
use crate::object::EntityRef;
use crate::resolver::OverlayResolver;
use std::sync::Arc;
use veneer_core::{Association, Constraint, ProgressMonitor, SchemaEntity, SourceError};

/// A merged entry, tagged with where it was declared.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlaid<T> {
    Real(T),
    Virtual(T),
}

impl<T> Overlaid<T> {
    pub fn get(&self) -> &T {
        match self {
            Overlaid::Real(item) | Overlaid::Virtual(item) => item,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Overlaid::Virtual(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Overlaid::Real(item) | Overlaid::Virtual(item) => item,
        }
    }
}

impl OverlayResolver {
    /// Real constraints of `entity` followed by its virtual ones.
    pub fn merge_constraints(
        &self,
        entity: &EntityRef,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<Overlaid<Constraint>>> {
        let mut merged = match real_part(entity, monitor)? {
            Some(real) => tag_real(real.constraints(monitor))?,
            None => Vec::new(),
        };
        if let Some(overlay) = self.resolve_virtual_entity(entity, false) {
            merged.extend(overlay.constraints().into_iter().map(Overlaid::Virtual));
        }
        Ok(merged)
    }

    /// Real associations of `entity` followed by its virtual foreign keys.
    pub fn merge_associations(
        &self,
        entity: &EntityRef,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<Overlaid<Association>>> {
        let mut merged = match real_part(entity, monitor)? {
            Some(real) => tag_real(real.associations(monitor))?,
            None => Vec::new(),
        };
        if let Some(overlay) = self.resolve_virtual_entity(entity, false) {
            merged.extend(overlay.foreign_keys().into_iter().map(Overlaid::Virtual));
        }
        Ok(merged)
    }

    /// Incoming references of `entity`.
    ///
    /// Virtual foreign keys declared on other entities are not reported here;
    /// only real references are returned.
    pub fn merge_references(
        &self,
        entity: &EntityRef,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<Overlaid<Association>>> {
        match real_part(entity, monitor)? {
            Some(real) => tag_real(real.references(monitor)),
            None => Ok(Vec::new()),
        }
    }
}

/// The real entity behind `entity`. Orphans have none.
fn real_part(
    entity: &EntityRef,
    monitor: &dyn ProgressMonitor,
) -> Result<Option<Arc<dyn SchemaEntity>>> {
    match entity {
        EntityRef::Real(real) => Ok(Some(Arc::clone(real))),
        EntityRef::Virtual(overlay) => overlay
            .real_entity(monitor)
            .map_err(OverlayError::MetadataAccess),
    }
}

fn tag_real<T>(items: std::result::Result<Vec<T>, SourceError>) -> Result<Vec<Overlaid<T>>> {
    items
        .map(|items| items.into_iter().map(Overlaid::Real).collect())
        .map_err(OverlayError::MetadataAccess)
}
