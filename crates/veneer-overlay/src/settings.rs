//! Transform settings: transformer options plus an explicit transformer filter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use veneer_core::{TransformOptions, TransformerDescriptor, Value};

/// Explicit allow/deny list of transformer ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformerFilter {
    /// Transformer chosen by the user; always admitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_transformer: Option<String>,

    /// Ids admitted even when custom or not applicable by default.
    #[serde(default)]
    pub included: BTreeSet<String>,

    /// Ids always removed.
    #[serde(default)]
    pub excluded: BTreeSet<String>,
}

impl TransformerFilter {
    /// A filter is declared once it names at least one transformer.
    pub fn is_declared(&self) -> bool {
        self.custom_transformer.is_some() || !self.included.is_empty() || !self.excluded.is_empty()
    }

    pub fn admits(&self, descriptor: &dyn TransformerDescriptor) -> bool {
        let id = descriptor.id();
        if self.excluded.contains(id) {
            return false;
        }
        if self.custom_transformer.as_deref() == Some(id) || self.included.contains(id) {
            return true;
        }
        !descriptor.is_custom() && descriptor.is_applicable_by_default()
    }
}

/// Serializable form of [`TransformSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub options: TransformOptions,
    #[serde(default)]
    pub filter: TransformerFilter,
}

/// Transformer options and filter owned by one virtual object.
///
/// Settings are shared between every reader that resolved them, so their
/// contents are behind locks and edits are visible to all holders.
#[derive(Debug, Default)]
pub struct TransformSettings {
    options: RwLock<TransformOptions>,
    filter: RwLock<TransformerFilter>,
}

impl TransformSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SettingsSnapshot) -> Self {
        Self {
            options: RwLock::new(snapshot.options),
            filter: RwLock::new(snapshot.filter),
        }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            options: self.options(),
            filter: self.filter(),
        }
    }

    pub fn options(&self) -> TransformOptions {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn option(&self, name: &str) -> Option<Value> {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn set_option(&self, name: impl Into<String>, value: Value) {
        self.options
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value);
    }

    pub fn remove_option(&self, name: &str) -> Option<Value> {
        self.options
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn filter(&self) -> TransformerFilter {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_filter(&self, filter: TransformerFilter) {
        *self.filter.write().unwrap_or_else(PoisonError::into_inner) = filter;
    }

    pub fn include_transformer(&self, id: impl Into<String>) {
        let id = id.into();
        let mut filter = self.filter.write().unwrap_or_else(PoisonError::into_inner);
        filter.excluded.remove(&id);
        filter.included.insert(id);
    }

    pub fn exclude_transformer(&self, id: impl Into<String>) {
        let id = id.into();
        let mut filter = self.filter.write().unwrap_or_else(PoisonError::into_inner);
        filter.included.remove(&id);
        filter.excluded.insert(id);
    }

    pub fn set_custom_transformer(&self, id: Option<String>) {
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .custom_transformer = id;
    }

    /// Apply the declared filter to `candidates` in place, preserving order.
    ///
    /// Returns `false`, leaving `candidates` untouched, when no filter is declared.
    pub fn filter_transformers(
        &self,
        candidates: &mut Vec<Arc<dyn TransformerDescriptor>>,
    ) -> bool {
        let filter = self.filter.read().unwrap_or_else(PoisonError::into_inner);
        if !filter.is_declared() {
            return false;
        }
        candidates.retain(|d| filter.admits(d.as_ref()));
        true
    }
}

/// Write-once slot holding an object's own settings.
///
/// The first writer wins; concurrent creators that lose the race drop their
/// instance and observe the winner's.
#[derive(Debug, Default)]
pub(crate) struct SettingsSlot(OnceLock<Arc<TransformSettings>>);

impl SettingsSlot {
    pub(crate) fn get(&self) -> Option<Arc<TransformSettings>> {
        self.0.get().cloned()
    }

    pub(crate) fn get_or_create(&self) -> Arc<TransformSettings> {
        self.get_or_create_with(|| ())
    }

    /// Like [`get_or_create`](Self::get_or_create). `on_create` runs only for
    /// the caller whose instance fills the slot.
    pub(crate) fn get_or_create_with(&self, on_create: impl FnOnce()) -> Arc<TransformSettings> {
        Arc::clone(self.0.get_or_init(|| {
            on_create();
            Arc::new(TransformSettings::new())
        }))
    }

    /// Install `settings` unless the slot is already filled.
    ///
    /// Returns the settings now held by the slot.
    pub(crate) fn install(&self, settings: Arc<TransformSettings>) -> Arc<TransformSettings> {
        let _ = self.0.set(settings);
        self.get_or_create()
    }
}
