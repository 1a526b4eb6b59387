//! Unwrapping virtual entities to the real entities they overlay.

use crate::error::{OverlayError, Result};
use crate::object::EntityRef;
use std::sync::Arc;
use veneer_core::{ProgressMonitor, SchemaEntity, VoidProgressMonitor};

/// The real entity behind `entity`.
///
/// Real entities are returned as is. A virtual entity without a backing real
/// entity, such as an orphan, is a resolution error.
pub fn require_real_entity(
    entity: &EntityRef,
    monitor: &dyn ProgressMonitor,
) -> Result<Arc<dyn SchemaEntity>> {
    match entity {
        EntityRef::Real(real) => Ok(Arc::clone(real)),
        EntityRef::Virtual(overlay) => overlay
            .real_entity(monitor)
            .map_err(OverlayError::MetadataAccess)?
            .ok_or_else(|| OverlayError::Resolution {
                object_id: overlay.full_id(),
            }),
    }
}

/// Best-effort [`require_real_entity`] for callers that cannot propagate
/// errors. On failure the error is logged and `entity` itself is returned.
pub fn try_real_entity(entity: &EntityRef) -> EntityRef {
    match require_real_entity(entity, &VoidProgressMonitor) {
        Ok(real) => EntityRef::Real(real),
        Err(err) => {
            tracing::error!(entity = %entity.name(), error = %err, "Failed to resolve real entity");
            entity.clone()
        }
    }
}
