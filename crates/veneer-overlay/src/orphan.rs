//! Process-wide store of virtual entities for containers without schema identity.
//!
//! Custom queries have no entity in the schema tree to attach an overlay to,
//! so their virtual entities are kept here under a key derived from the
//! container. Entries are never evicted: they live as long as the cache,
//! which is meant to be created once per process and shared.

use crate::model::VirtualEntity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use veneer_core::DataContainer;

/// Keyed store of orphan virtual entities.
#[derive(Debug, Default)]
pub struct OrphanCache {
    entries: Mutex<HashMap<String, Arc<VirtualEntity>>>,
}

impl OrphanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derived identity of a container: `<data source>::<kind>::<identity text>`.
    ///
    /// The identity text is kept whole, so distinct containers of one data
    /// source never share a key.
    pub fn orphan_key(container: &dyn DataContainer) -> String {
        format!(
            "{}::{}::{}",
            container.data_source(),
            container.kind(),
            container.identity_text()
        )
    }

    pub fn get(&self, key: &str) -> Option<Arc<VirtualEntity>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Entity registered under `key`, created by `make` if absent.
    ///
    /// Lookup and insertion happen under one lock, so concurrent callers with
    /// the same key all receive the single entity created. `make` runs while
    /// the lock is held and must not block.
    pub fn get_or_create(
        &self,
        key: &str,
        make: impl FnOnce() -> Arc<VirtualEntity>,
    ) -> Arc<VirtualEntity> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entity) = entries.get(key) {
            return Arc::clone(entity);
        }
        let entity = make();
        tracing::debug!(key = %key, entity = %entity.name(), "Created orphan virtual entity");
        entries.insert(key.to_string(), Arc::clone(&entity));
        entity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
