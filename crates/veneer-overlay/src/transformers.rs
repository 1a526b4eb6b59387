//! Choosing the value transformers that apply to an attribute.

use crate::object::AttributeBinding;
use crate::resolver::OverlayResolver;
use veneer_core::AttributeTransformer;

impl OverlayResolver {
    /// Transformers to apply to the attribute behind `binding`, in registry order.
    ///
    /// Candidates come from the transformer registry, restricted to custom or
    /// non-custom ones when `custom` is given. A transformer filter declared in
    /// the attribute's effective settings decides membership on its own;
    /// otherwise only non-custom, applicable-by-default candidates are kept.
    ///
    /// Returns `None` when nothing is left to apply.
    pub fn select_transformers(
        &self,
        binding: &AttributeBinding,
        custom: Option<bool>,
    ) -> Option<Vec<Box<dyn AttributeTransformer>>> {
        let mut candidates =
            self.transformers
                .find_transformers(binding.data_source(), binding.attribute(), custom);
        if candidates.is_empty() {
            return None;
        }

        let filtered = self
            .binding_transform_settings(binding, false)
            .is_some_and(|settings| settings.filter_transformers(&mut candidates));
        if !filtered {
            candidates.retain(|d| !d.is_custom() && d.is_applicable_by_default());
        }
        if candidates.is_empty() {
            return None;
        }

        Some(candidates.iter().map(|d| d.instantiate()).collect())
    }
}
