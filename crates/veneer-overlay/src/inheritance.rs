//! Transform settings lookup along the overlay hierarchy.
//!
//! Settings declared at a coarser scope (entity, schema, data source) apply to
//! every object beneath it until a finer scope declares its own.

use crate::model::VirtualAttribute;
use crate::object::{AttributeBinding, VirtualObject};
use crate::resolver::OverlayResolver;
use crate::settings::TransformSettings;
use std::sync::Arc;
use veneer_core::TransformOptions;

/// Settings for `attribute`.
///
/// Returns the attribute's own settings if it has them. Otherwise, with
/// `create` set, attaches new empty settings to the attribute; without it,
/// returns the settings of the nearest ancestor that owns some.
pub fn resolve_transform_settings(
    attribute: &Arc<VirtualAttribute>,
    create: bool,
) -> Option<Arc<TransformSettings>> {
    if let Some(settings) = attribute.transform_settings() {
        return Some(settings);
    }
    if create {
        return Some(attribute.create_transform_settings());
    }
    inherited_settings(VirtualObject::Attribute(Arc::clone(attribute)).parent())
}

/// First settings found walking from `start` towards the model.
pub(crate) fn inherited_settings(start: Option<VirtualObject>) -> Option<Arc<TransformSettings>> {
    let mut current = start;
    while let Some(object) = current {
        if let Some(settings) = object.transform_settings() {
            return Some(settings);
        }
        current = object.parent();
    }
    None
}

impl OverlayResolver {
    /// Settings for the attribute behind `binding`.
    ///
    /// Resolves the virtual entity, then its virtual attribute, then the
    /// attribute's settings. With `create` set, missing overlays are created
    /// and the attribute receives its own settings. Without it, a binding
    /// whose entity or attribute has no overlay has no settings.
    pub fn binding_transform_settings(
        &self,
        binding: &AttributeBinding,
        create: bool,
    ) -> Option<Arc<TransformSettings>> {
        let entity = self.resolve_binding_entity(binding, create)?;
        let attribute = entity.virtual_attribute(&binding.attribute().name, create)?;
        resolve_transform_settings(&attribute, create)
    }

    /// Transformer options in effect for `binding`; empty when no settings
    /// exist anywhere along its hierarchy.
    pub fn collect_transform_options(&self, binding: &AttributeBinding) -> TransformOptions {
        self.binding_transform_settings(binding, false)
            .map(|settings| settings.options())
            .unwrap_or_default()
    }
}
