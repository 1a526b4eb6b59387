//! Mapping schema objects to their virtual counterparts.

use crate::model::{VirtualEntity, VirtualModel};
use crate::object::{AttributeBinding, ContainerRef, EntityRef, SchemaObjectRef, VirtualObject};
use crate::orphan::OrphanCache;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use veneer_core::{DataContainer, DataSourceId, OverlayConfig, TransformerRegistry};

/// Entry point of the overlay layer.
///
/// Holds one [`VirtualModel`] per data source, the shared [`OrphanCache`] and
/// the transformer registry consulted when selecting value transformers.
pub struct OverlayResolver {
    config: OverlayConfig,
    models: RwLock<HashMap<DataSourceId, Arc<VirtualModel>>>,
    orphans: Arc<OrphanCache>,
    pub(crate) transformers: Arc<dyn TransformerRegistry>,
}

impl OverlayResolver {
    pub fn new(
        config: OverlayConfig,
        orphans: Arc<OrphanCache>,
        transformers: Arc<dyn TransformerRegistry>,
    ) -> Self {
        Self {
            config,
            models: RwLock::new(HashMap::new()),
            orphans,
            transformers,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn orphans(&self) -> &Arc<OrphanCache> {
        &self.orphans
    }

    /// Register the virtual model of a data source, returning the one it replaces.
    pub fn register_model(&self, model: Arc<VirtualModel>) -> Option<Arc<VirtualModel>> {
        tracing::debug!(data_source = %model.data_source(), "Registered virtual model");
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model.data_source().clone(), model)
    }

    pub fn model(&self, data_source: &DataSourceId) -> Option<Arc<VirtualModel>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(data_source)
            .cloned()
    }

    pub(crate) fn require_model(&self, data_source: &DataSourceId) -> Option<Arc<VirtualModel>> {
        let model = self.model(data_source);
        if model.is_none() {
            tracing::warn!(
                data_source = %data_source,
                "No virtual model registered for data source"
            );
        }
        model
    }

    /// Virtual entity of `entity`.
    ///
    /// Virtual entities are returned unchanged. Real entities are looked up in
    /// their data source's model, which creates an empty overlay when `create`
    /// is set.
    pub fn resolve_virtual_entity(
        &self,
        entity: &EntityRef,
        create: bool,
    ) -> Option<Arc<VirtualEntity>> {
        match entity {
            EntityRef::Virtual(entity) => Some(Arc::clone(entity)),
            EntityRef::Real(real) => self
                .require_model(real.data_source())?
                .find_entity(real.as_ref(), create),
        }
    }

    /// Virtual entity of a data container.
    ///
    /// Containers without schema identity are served from the orphan cache
    /// under their derived key.
    pub fn resolve_container_entity(
        &self,
        container: &ContainerRef,
        create: bool,
    ) -> Option<Arc<VirtualEntity>> {
        match container {
            ContainerRef::Entity(entity) => self.resolve_virtual_entity(entity, create),
            ContainerRef::Detached(container) => self.resolve_orphan(container.as_ref(), create),
        }
    }

    fn resolve_orphan(
        &self,
        container: &dyn DataContainer,
        create: bool,
    ) -> Option<Arc<VirtualEntity>> {
        let key = OrphanCache::orphan_key(container);
        if !create {
            return self.orphans.get(&key);
        }
        let model = self.require_model(container.data_source())?;
        Some(
            self.orphans
                .get_or_create(&key, || VirtualEntity::orphan(&model, container.name())),
        )
    }

    /// Virtual entity of the attribute behind `binding`: through the owning
    /// entity when known, else through the binding's container.
    pub fn resolve_binding_entity(
        &self,
        binding: &AttributeBinding,
        create: bool,
    ) -> Option<Arc<VirtualEntity>> {
        match binding.entity() {
            Some(entity) => self.resolve_virtual_entity(entity, create),
            None => self.resolve_container_entity(binding.container(), create),
        }
    }

    /// Virtual counterpart of any schema object.
    pub fn resolve_virtual_object(
        &self,
        object: &SchemaObjectRef,
        create: bool,
    ) -> Option<VirtualObject> {
        match object {
            SchemaObjectRef::Virtual(object) => Some(object.clone()),
            SchemaObjectRef::Real(real) => self
                .require_model(real.data_source())?
                .find_object(real, create),
        }
    }
}
