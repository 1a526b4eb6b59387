//! Handles to real and virtual schema objects.
//!
//! Consumers hand the resolver whatever they hold: a real entity discovered
//! from the data source, a virtual entity obtained earlier, or an ad-hoc data
//! container. These tagged unions let every resolution path treat both kinds
//! uniformly.

use crate::model::{VirtualAttribute, VirtualContainer, VirtualEntity, VirtualModel};
use crate::settings::TransformSettings;
use std::sync::Arc;
use veneer_core::{AttributeMeta, DataContainer, DataSourceId, ObjectId, SchemaEntity};

/// A table-like entity, real or virtual.
#[derive(Debug, Clone)]
pub enum EntityRef {
    Real(Arc<dyn SchemaEntity>),
    Virtual(Arc<VirtualEntity>),
}

impl EntityRef {
    pub fn is_virtual(&self) -> bool {
        matches!(self, EntityRef::Virtual(_))
    }

    pub fn as_virtual(&self) -> Option<&Arc<VirtualEntity>> {
        match self {
            EntityRef::Virtual(entity) => Some(entity),
            EntityRef::Real(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityRef::Real(entity) => entity.name(),
            EntityRef::Virtual(entity) => entity.name(),
        }
    }

    pub fn data_source(&self) -> &DataSourceId {
        match self {
            EntityRef::Real(entity) => entity.data_source(),
            EntityRef::Virtual(entity) => entity.data_source(),
        }
    }
}

impl From<Arc<dyn SchemaEntity>> for EntityRef {
    fn from(entity: Arc<dyn SchemaEntity>) -> Self {
        EntityRef::Real(entity)
    }
}

impl From<Arc<VirtualEntity>> for EntityRef {
    fn from(entity: Arc<VirtualEntity>) -> Self {
        EntityRef::Virtual(entity)
    }
}

/// The container rows come from: an entity, or something without schema
/// identity such as a custom query.
#[derive(Debug, Clone)]
pub enum ContainerRef {
    Entity(EntityRef),
    Detached(Arc<dyn DataContainer>),
}

impl ContainerRef {
    pub fn data_source(&self) -> &DataSourceId {
        match self {
            ContainerRef::Entity(entity) => entity.data_source(),
            ContainerRef::Detached(container) => container.data_source(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ContainerRef::Entity(entity) => entity.name(),
            ContainerRef::Detached(container) => container.name(),
        }
    }
}

/// A result column bound to the attribute it displays.
#[derive(Debug, Clone)]
pub struct AttributeBinding {
    attribute: AttributeMeta,
    /// Entity owning the underlying attribute, when it can be resolved.
    entity: Option<EntityRef>,
    container: ContainerRef,
}

impl AttributeBinding {
    /// Binding for an attribute of a known entity.
    pub fn for_entity(entity: EntityRef, attribute: AttributeMeta) -> Self {
        Self {
            attribute,
            container: ContainerRef::Entity(entity.clone()),
            entity: Some(entity),
        }
    }

    /// Binding for a column of a container without schema identity.
    pub fn for_container(container: Arc<dyn DataContainer>, attribute: AttributeMeta) -> Self {
        Self {
            attribute,
            entity: None,
            container: ContainerRef::Detached(container),
        }
    }

    /// Binding with an explicit container and optional owning entity.
    pub fn new(
        container: ContainerRef,
        entity: Option<EntityRef>,
        attribute: AttributeMeta,
    ) -> Self {
        Self {
            attribute,
            entity,
            container,
        }
    }

    pub fn attribute(&self) -> &AttributeMeta {
        &self.attribute
    }

    pub fn entity(&self) -> Option<&EntityRef> {
        self.entity.as_ref()
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    pub fn data_source(&self) -> &DataSourceId {
        match &self.entity {
            Some(entity) => entity.data_source(),
            None => self.container.data_source(),
        }
    }
}

/// An object of the real metadata tree.
#[derive(Debug, Clone)]
pub enum RealObject {
    /// A catalog or schema scope; the empty path denotes the data source.
    Container(ObjectId),
    Entity(Arc<dyn SchemaEntity>),
    Attribute {
        entity: Arc<dyn SchemaEntity>,
        attribute: AttributeMeta,
    },
}

impl RealObject {
    pub fn data_source(&self) -> &DataSourceId {
        match self {
            RealObject::Container(id) => id.data_source(),
            RealObject::Entity(entity) | RealObject::Attribute { entity, .. } => {
                entity.data_source()
            }
        }
    }
}

/// An object of a virtual model.
#[derive(Debug, Clone)]
pub enum VirtualObject {
    Model(Arc<VirtualModel>),
    Container(Arc<VirtualContainer>),
    Entity(Arc<VirtualEntity>),
    Attribute(Arc<VirtualAttribute>),
}

impl VirtualObject {
    /// Settings owned by this object itself.
    pub fn transform_settings(&self) -> Option<Arc<TransformSettings>> {
        match self {
            VirtualObject::Model(model) => model.transform_settings(),
            VirtualObject::Container(container) => container.transform_settings(),
            VirtualObject::Entity(entity) => entity.transform_settings(),
            VirtualObject::Attribute(attribute) => attribute.transform_settings(),
        }
    }

    /// The enclosing overlay object; `None` at the model or once an owner is gone.
    pub fn parent(&self) -> Option<VirtualObject> {
        match self {
            VirtualObject::Model(_) => None,
            VirtualObject::Container(container) => {
                let model = container.model()?;
                Some(model.nearest_scope(container.id()))
            }
            VirtualObject::Entity(entity) => {
                let model = entity.model()?;
                match entity.id() {
                    Some(id) => Some(model.nearest_scope(id)),
                    None => Some(VirtualObject::Model(model)),
                }
            }
            VirtualObject::Attribute(attribute) => attribute.entity().map(VirtualObject::Entity),
        }
    }
}

/// Any schema object, tagged by whether it is already virtual.
#[derive(Debug, Clone)]
pub enum SchemaObjectRef {
    Real(RealObject),
    Virtual(VirtualObject),
}

impl SchemaObjectRef {
    pub fn is_virtual(&self) -> bool {
        matches!(self, SchemaObjectRef::Virtual(_))
    }
}

impl From<RealObject> for SchemaObjectRef {
    fn from(object: RealObject) -> Self {
        SchemaObjectRef::Real(object)
    }
}

impl From<VirtualObject> for SchemaObjectRef {
    fn from(object: VirtualObject) -> Self {
        SchemaObjectRef::Virtual(object)
    }
}
