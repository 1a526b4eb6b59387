//! Value transformers and their registry.
//!
//! A transformer rewrites how an attribute's values are presented (e.g. an
//! epoch number shown as a timestamp). Which transformers apply to a given
//! attribute is decided by the overlay layer from the registry's candidates.

use crate::identity::DataSourceId;
use crate::schema::{AttributeMeta, DataKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Transformer options keyed by option name.
pub type TransformOptions = BTreeMap<String, Value>;

/// An instantiated value transformer.
pub trait AttributeTransformer: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn transform(&self, value: &Value, options: &TransformOptions) -> Value;
}

/// Registry entry describing a transformer.
pub trait TransformerDescriptor: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    /// Custom transformers only apply when explicitly chosen.
    fn is_custom(&self) -> bool;

    /// Whether the transformer applies when no explicit choice was made.
    fn is_applicable_by_default(&self) -> bool;

    fn instantiate(&self) -> Box<dyn AttributeTransformer>;
}

/// Source of candidate transformers for an attribute.
pub trait TransformerRegistry: Send + Sync {
    /// Candidates for `attribute`, in registry order.
    ///
    /// When `custom` is given, only descriptors whose custom flag equals it are
    /// returned.
    fn find_transformers(
        &self,
        data_source: &DataSourceId,
        attribute: &AttributeMeta,
        custom: Option<bool>,
    ) -> Vec<Arc<dyn TransformerDescriptor>>;
}

/// Statically declared transformer descriptor.
pub struct TransformerDefinition {
    pub id: String,
    pub custom: bool,
    pub applicable_by_default: bool,
    /// Value kinds the transformer handles; empty means every kind.
    pub kinds: Vec<DataKind>,
    factory: fn() -> Box<dyn AttributeTransformer>,
}

impl TransformerDefinition {
    pub fn new(id: impl Into<String>, factory: fn() -> Box<dyn AttributeTransformer>) -> Self {
        Self {
            id: id.into(),
            custom: false,
            applicable_by_default: true,
            kinds: Vec::new(),
            factory,
        }
    }

    pub fn custom(mut self, custom: bool) -> Self {
        self.custom = custom;
        self
    }

    pub fn applicable_by_default(mut self, applicable: bool) -> Self {
        self.applicable_by_default = applicable;
        self
    }

    pub fn for_kind(mut self, kind: DataKind) -> Self {
        self.kinds.push(kind);
        self
    }

    fn handles(&self, kind: DataKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

impl fmt::Debug for TransformerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerDefinition")
            .field("id", &self.id)
            .field("custom", &self.custom)
            .field("applicable_by_default", &self.applicable_by_default)
            .field("kinds", &self.kinds)
            .finish()
    }
}

impl TransformerDescriptor for TransformerDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_custom(&self) -> bool {
        self.custom
    }

    fn is_applicable_by_default(&self) -> bool {
        self.applicable_by_default
    }

    fn instantiate(&self) -> Box<dyn AttributeTransformer> {
        (self.factory)()
    }
}

/// Registry over a fixed, ordered list of definitions.
#[derive(Debug, Default)]
pub struct StaticTransformerRegistry {
    definitions: Vec<Arc<TransformerDefinition>>,
}

impl StaticTransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, definition: TransformerDefinition) -> Self {
        self.register(definition);
        self
    }

    pub fn register(&mut self, definition: TransformerDefinition) {
        self.definitions.push(Arc::new(definition));
    }
}

impl TransformerRegistry for StaticTransformerRegistry {
    fn find_transformers(
        &self,
        _data_source: &DataSourceId,
        attribute: &AttributeMeta,
        custom: Option<bool>,
    ) -> Vec<Arc<dyn TransformerDescriptor>> {
        let kind = attribute.data_kind();
        self.definitions
            .iter()
            .filter(|d| d.handles(kind))
            .filter(|d| custom.is_none_or(|c| d.custom == c))
            .map(|d| Arc::clone(d) as Arc<dyn TransformerDescriptor>)
            .collect()
    }
}
