//! The virtual model of one data source.
//!
//! A [`VirtualModel`] owns the overlays declared for a data source connection:
//! container scopes (catalogs, schemas), entities and their attributes. Objects
//! are indexed by the identity of the real object they overlay and point back
//! to their owners through weak references, which is what the settings
//! inheritance walk follows.

use crate::object::{RealObject, VirtualObject};
use crate::settings::{SettingsSlot, TransformSettings};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use veneer_core::{
    Association, Constraint, DataSourceId, ObjectId, ProgressMonitor, SchemaCatalog, SchemaEntity,
    SourceError,
};

/// Overlays for one data source connection.
pub struct VirtualModel {
    data_source: DataSourceId,
    catalog: Arc<dyn SchemaCatalog>,
    settings: SettingsSlot,
    containers: RwLock<HashMap<ObjectId, Arc<VirtualContainer>>>,
    entities: RwLock<HashMap<ObjectId, Arc<VirtualEntity>>>,
}

impl VirtualModel {
    /// Create an empty model. `catalog` locates the real entities behind
    /// virtual ones.
    pub fn new(data_source: DataSourceId, catalog: Arc<dyn SchemaCatalog>) -> Arc<Self> {
        Arc::new(Self {
            data_source,
            catalog,
            settings: SettingsSlot::default(),
            containers: RwLock::new(HashMap::new()),
            entities: RwLock::new(HashMap::new()),
        })
    }

    pub fn data_source(&self) -> &DataSourceId {
        &self.data_source
    }

    pub fn catalog(&self) -> &Arc<dyn SchemaCatalog> {
        &self.catalog
    }

    /// Settings applying to every object of the data source.
    pub fn transform_settings(&self) -> Option<Arc<TransformSettings>> {
        self.settings.get()
    }

    pub fn create_transform_settings(&self) -> Arc<TransformSettings> {
        self.settings.get_or_create()
    }

    /// Virtual entity overlaying `real`, created empty when missing and `create` is set.
    pub fn find_entity(
        self: &Arc<Self>,
        real: &dyn SchemaEntity,
        create: bool,
    ) -> Option<Arc<VirtualEntity>> {
        self.entity_by_id(real.id(), create)
    }

    pub fn entity_by_id(
        self: &Arc<Self>,
        id: &ObjectId,
        create: bool,
    ) -> Option<Arc<VirtualEntity>> {
        if id.data_source() != &self.data_source {
            tracing::warn!(
                data_source = %self.data_source,
                object = %id,
                "Entity belongs to another data source"
            );
            return None;
        }

        if let Some(entity) = self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Some(Arc::clone(entity));
        }
        if !create {
            return None;
        }

        let mut entities = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        let entity = entities.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(entity = %id, "Created virtual entity");
            VirtualEntity::overlay(self, id.clone())
        });
        Some(Arc::clone(entity))
    }

    /// Virtual scope for a catalog or schema.
    pub fn find_container(
        self: &Arc<Self>,
        id: &ObjectId,
        create: bool,
    ) -> Option<Arc<VirtualContainer>> {
        if let Some(container) = self
            .containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Some(Arc::clone(container));
        }
        if !create || id.is_root() || id.data_source() != &self.data_source {
            return None;
        }

        let mut containers = self.containers.write().unwrap_or_else(PoisonError::into_inner);
        let container = containers.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(container = %id, "Created virtual container");
            Arc::new(VirtualContainer {
                id: id.clone(),
                model: Arc::downgrade(self),
                settings: SettingsSlot::default(),
            })
        });
        Some(Arc::clone(container))
    }

    /// Virtual counterpart of any real object.
    pub fn find_object(
        self: &Arc<Self>,
        object: &RealObject,
        create: bool,
    ) -> Option<VirtualObject> {
        match object {
            RealObject::Container(id) if id.is_root() => {
                Some(VirtualObject::Model(Arc::clone(self)))
            }
            RealObject::Container(id) => {
                self.find_container(id, create).map(VirtualObject::Container)
            }
            RealObject::Entity(entity) => self
                .find_entity(entity.as_ref(), create)
                .map(VirtualObject::Entity),
            RealObject::Attribute { entity, attribute } => self
                .find_entity(entity.as_ref(), create)?
                .virtual_attribute(&attribute.name, create)
                .map(VirtualObject::Attribute),
        }
    }

    /// Overlaid entities, ordered by identity.
    pub fn entities(&self) -> Vec<Arc<VirtualEntity>> {
        let mut entities: Vec<_> = self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities
    }

    /// Innermost existing scope enclosing `id`: a container, else the model.
    pub(crate) fn nearest_scope(self: &Arc<Self>, id: &ObjectId) -> VirtualObject {
        let containers = self.containers.read().unwrap_or_else(PoisonError::into_inner);
        id.ancestors()
            .find_map(|ancestor| containers.get(&ancestor).cloned())
            .map(VirtualObject::Container)
            .unwrap_or_else(|| VirtualObject::Model(Arc::clone(self)))
    }
}

impl fmt::Debug for VirtualModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualModel")
            .field("data_source", &self.data_source)
            .finish_non_exhaustive()
    }
}

/// Virtual scope for a catalog or schema, carrying inheritable settings.
pub struct VirtualContainer {
    id: ObjectId,
    model: Weak<VirtualModel>,
    settings: SettingsSlot,
}

impl VirtualContainer {
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn model(&self) -> Option<Arc<VirtualModel>> {
        self.model.upgrade()
    }

    pub fn transform_settings(&self) -> Option<Arc<TransformSettings>> {
        self.settings.get()
    }

    pub fn create_transform_settings(&self) -> Arc<TransformSettings> {
        self.settings.get_or_create()
    }
}

impl fmt::Debug for VirtualContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualContainer")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Overlay for a table-like entity, or for a container without schema identity.
pub struct VirtualEntity {
    /// Identity of the overlaid real entity; `None` for orphans.
    id: Option<ObjectId>,
    name: String,
    data_source: DataSourceId,
    model: Weak<VirtualModel>,
    attributes: RwLock<Vec<Arc<VirtualAttribute>>>,
    constraints: RwLock<Vec<Constraint>>,
    foreign_keys: RwLock<Vec<Association>>,
    description_columns: RwLock<Option<String>>,
    settings: SettingsSlot,
}

impl VirtualEntity {
    fn overlay(model: &Arc<VirtualModel>, id: ObjectId) -> Arc<Self> {
        Arc::new(Self {
            name: id.name().to_string(),
            id: Some(id),
            data_source: model.data_source.clone(),
            model: Arc::downgrade(model),
            attributes: RwLock::new(Vec::new()),
            constraints: RwLock::new(Vec::new()),
            foreign_keys: RwLock::new(Vec::new()),
            description_columns: RwLock::new(None),
            settings: SettingsSlot::default(),
        })
    }

    /// Entity for a data container that has no schema identity.
    pub fn orphan(model: &Arc<VirtualModel>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: None,
            name: name.into(),
            data_source: model.data_source.clone(),
            model: Arc::downgrade(model),
            attributes: RwLock::new(Vec::new()),
            constraints: RwLock::new(Vec::new()),
            foreign_keys: RwLock::new(Vec::new()),
            description_columns: RwLock::new(None),
            settings: SettingsSlot::default(),
        })
    }

    pub fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_source(&self) -> &DataSourceId {
        &self.data_source
    }

    pub fn is_orphan(&self) -> bool {
        self.id.is_none()
    }

    /// Identity used in messages: the real object id, or `<data source>::<name>`.
    pub fn full_id(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!("{}::{}", self.data_source, self.name),
        }
    }

    pub fn model(&self) -> Option<Arc<VirtualModel>> {
        self.model.upgrade()
    }

    /// Locate the real entity this overlay belongs to.
    ///
    /// Orphans, and entities whose model is gone, have none.
    pub fn real_entity(
        &self,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Option<Arc<dyn SchemaEntity>>, SourceError> {
        let (Some(id), Some(model)) = (&self.id, self.model()) else {
            return Ok(None);
        };
        model.catalog.find_entity(id, monitor)
    }

    /// Overlay of the attribute named `name`.
    pub fn virtual_attribute(
        self: &Arc<Self>,
        name: &str,
        create: bool,
    ) -> Option<Arc<VirtualAttribute>> {
        if let Some(attr) = self
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|a| a.name == name)
        {
            return Some(Arc::clone(attr));
        }
        if !create {
            return None;
        }
        Some(self.insert_attribute(name, None))
    }

    /// Declare a purely virtual column. An existing attribute of the same
    /// name is returned unchanged.
    pub fn add_custom_attribute(
        self: &Arc<Self>,
        name: &str,
        type_name: impl Into<String>,
    ) -> Arc<VirtualAttribute> {
        self.insert_attribute(name, Some(type_name.into()))
    }

    fn insert_attribute(
        self: &Arc<Self>,
        name: &str,
        type_name: Option<String>,
    ) -> Arc<VirtualAttribute> {
        let mut attributes = self.attributes.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(attr) = attributes.iter().find(|a| a.name == name) {
            return Arc::clone(attr);
        }
        let attr = Arc::new(VirtualAttribute {
            name: name.to_string(),
            type_name,
            entity: Arc::downgrade(self),
            settings: SettingsSlot::default(),
        });
        attributes.push(Arc::clone(&attr));
        attr
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> Vec<Arc<VirtualAttribute>> {
        self.attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Virtual constraints in declaration order.
    pub fn constraints(&self) -> Vec<Constraint> {
        self.constraints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn add_constraint(&self, constraint: Constraint) {
        self.constraints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(constraint);
    }

    /// Virtual foreign keys in declaration order.
    pub fn foreign_keys(&self) -> Vec<Association> {
        self.foreign_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn add_foreign_key(&self, foreign_key: Association) {
        self.foreign_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(foreign_key);
    }

    /// Comma-separated description column spec, e.g. `"first_name,last_name"`.
    pub fn description_columns(&self) -> Option<String> {
        self.description_columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_description_columns(&self, columns: Option<String>) {
        *self
            .description_columns
            .write()
            .unwrap_or_else(PoisonError::into_inner) = columns;
    }

    /// The description column spec split into trimmed column names.
    pub fn description_column_names(&self) -> Vec<String> {
        self.description_columns()
            .map(|spec| {
                spec.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn transform_settings(&self) -> Option<Arc<TransformSettings>> {
        self.settings.get()
    }

    pub fn create_transform_settings(&self) -> Arc<TransformSettings> {
        self.settings.get_or_create()
    }

    /// Attach previously stored settings. Existing settings win.
    pub fn install_transform_settings(
        &self,
        settings: Arc<TransformSettings>,
    ) -> Arc<TransformSettings> {
        self.settings.install(settings)
    }
}

impl fmt::Debug for VirtualEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualEntity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("data_source", &self.data_source)
            .finish_non_exhaustive()
    }
}

/// Overlay for a real or purely virtual column.
pub struct VirtualAttribute {
    name: String,
    /// Declared type of a purely virtual column.
    type_name: Option<String>,
    entity: Weak<VirtualEntity>,
    settings: SettingsSlot,
}

impl VirtualAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Whether the column exists only in the overlay.
    pub fn is_custom(&self) -> bool {
        self.type_name.is_some()
    }

    pub fn entity(&self) -> Option<Arc<VirtualEntity>> {
        self.entity.upgrade()
    }

    /// Settings owned by this attribute itself, without inheritance.
    pub fn transform_settings(&self) -> Option<Arc<TransformSettings>> {
        self.settings.get()
    }

    pub(crate) fn create_transform_settings(&self) -> Arc<TransformSettings> {
        self.settings.get_or_create_with(|| {
            tracing::debug!(attribute = %self.name, "Created attribute transform settings");
        })
    }
}

impl fmt::Debug for VirtualAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualAttribute")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
