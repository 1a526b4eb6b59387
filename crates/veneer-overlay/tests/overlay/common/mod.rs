//! Shared fixtures for the overlay integration tests.
//!
//! This module provides:
//! - A schema snapshot of a small shop database
//! - A resolver wired to that snapshot and a transformer registry
//! - Helpers to look up real entities and build sessions

#![allow(dead_code)]

use serde_json::Value;
use std::sync::Arc;
use veneer_core::{
    AttributeMeta, AttributeTransformer, DataKind, DataSourceId, DefaultValueHandler, ObjectId,
    OverlayConfig, ProgressMonitor, SchemaEntity, SimpleSession, SnapshotCatalog,
    StaticTransformerRegistry, TransformOptions, TransformerDefinition, VoidProgressMonitor,
};
use veneer_overlay::{AttributeBinding, EntityRef, OrphanCache, OverlayResolver, VirtualModel};

// =============================================================================
// SCHEMA SNAPSHOT
// =============================================================================

pub const DATA_SOURCE: &str = "shop-db";

pub const SHOP_SNAPSHOT: &str = r#"{
    "data_source": "shop-db",
    "tables": [
        {
            "container": ["shop", "public"],
            "name": "customers",
            "columns": [
                {"name": "id", "type_name": "int8", "nullable": false},
                {"name": "email", "type_name": "varchar(255)"},
                {"name": "full_name", "type_name": "text"}
            ],
            "constraints": [
                {"name": "customers_pkey", "kind": "primary_key", "columns": ["id"]},
                {"name": "customers_email_key", "kind": "unique_key", "columns": ["email"]}
            ]
        },
        {
            "container": ["shop", "public"],
            "name": "orders",
            "columns": [
                {"name": "id", "type_name": "int8", "nullable": false},
                {"name": "customer_id", "type_name": "int8"},
                {"name": "status", "type_name": "text"},
                {"name": "payload", "type_name": "jsonb"}
            ],
            "constraints": [
                {"name": "orders_pkey", "kind": "primary_key", "columns": ["id"]}
            ],
            "foreign_keys": [
                {
                    "name": "orders_customer_fk",
                    "referenced_table": "customers",
                    "columns": [{"column": "customer_id", "referenced_column": "id"}]
                }
            ]
        },
        {
            "container": ["shop", "audit"],
            "name": "events",
            "columns": [
                {"name": "id", "type_name": "int8"},
                {"name": "order_id", "type_name": "int8"},
                {"name": "kind", "type_name": "text"}
            ]
        }
    ]
}"#;

pub fn data_source() -> DataSourceId {
    DataSourceId::new(DATA_SOURCE)
}

pub fn object_id(path: &[&str]) -> ObjectId {
    ObjectId::new(data_source(), path.iter().copied())
}

pub fn catalog() -> Arc<SnapshotCatalog> {
    match SnapshotCatalog::from_json(SHOP_SNAPSHOT) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => panic!("Failed to build shop snapshot: {}", e),
    }
}

// =============================================================================
// TRANSFORMERS
// =============================================================================

/// Upper-cases string values.
#[derive(Debug)]
pub struct Upper;

impl AttributeTransformer for Upper {
    fn id(&self) -> &str {
        "upper"
    }

    fn transform(&self, value: &Value, _options: &TransformOptions) -> Value {
        match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other.clone(),
        }
    }
}

/// Replaces a value with the `mask` option, `"***"` by default.
#[derive(Debug)]
pub struct Mask;

impl AttributeTransformer for Mask {
    fn id(&self) -> &str {
        "mask"
    }

    fn transform(&self, _value: &Value, options: &TransformOptions) -> Value {
        options
            .get("mask")
            .cloned()
            .unwrap_or_else(|| Value::String("***".to_string()))
    }
}

/// Pretty-prints structured values. Only applied on request.
#[derive(Debug)]
pub struct PrettyJson;

impl AttributeTransformer for PrettyJson {
    fn id(&self) -> &str {
        "pretty_json"
    }

    fn transform(&self, value: &Value, _options: &TransformOptions) -> Value {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Value::String(text),
            Err(_) => value.clone(),
        }
    }
}

fn upper() -> Box<dyn AttributeTransformer> {
    Box::new(Upper)
}

fn mask() -> Box<dyn AttributeTransformer> {
    Box::new(Mask)
}

fn pretty_json() -> Box<dyn AttributeTransformer> {
    Box::new(PrettyJson)
}

pub fn registry() -> StaticTransformerRegistry {
    StaticTransformerRegistry::new()
        .with(TransformerDefinition::new("upper", upper).for_kind(DataKind::String))
        .with(TransformerDefinition::new("mask", mask).custom(true))
        .with(
            TransformerDefinition::new("pretty_json", pretty_json)
                .applicable_by_default(false)
                .for_kind(DataKind::Structure),
        )
}

// =============================================================================
// RESOLVER
// =============================================================================

pub struct TestContext {
    pub resolver: OverlayResolver,
    pub catalog: Arc<SnapshotCatalog>,
    pub model: Arc<VirtualModel>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(OverlayConfig::default())
    }

    pub fn with_config(config: OverlayConfig) -> Self {
        let catalog = catalog();
        let model = VirtualModel::new(data_source(), catalog.clone());
        let resolver =
            OverlayResolver::new(config, Arc::new(OrphanCache::new()), Arc::new(registry()));
        resolver.register_model(model.clone());
        Self {
            resolver,
            catalog,
            model,
        }
    }

    /// Real entity at `path`, e.g. `["shop", "public", "orders"]`.
    pub fn real(&self, path: &[&str]) -> Arc<dyn SchemaEntity> {
        let Some(entity) = self.catalog.entity(&object_id(path)) else {
            panic!("No table {:?} in shop snapshot", path);
        };
        entity
    }

    pub fn entity(&self, path: &[&str]) -> EntityRef {
        EntityRef::Real(self.real(path))
    }

    /// Column metadata of a real entity.
    pub fn column(&self, path: &[&str], name: &str) -> AttributeMeta {
        let attributes = self
            .real(path)
            .attributes(&VoidProgressMonitor)
            .unwrap_or_default();
        match attributes.into_iter().find(|a| a.name == name) {
            Some(attribute) => attribute,
            None => panic!("No column {} in {:?}", name, path),
        }
    }

    /// Binding for a real column whose entity and attribute already have overlays.
    pub fn overlaid(&self, path: &[&str], name: &str) -> AttributeBinding {
        let entity = self.entity(path);
        let Some(overlay) = self.resolver.resolve_virtual_entity(&entity, true) else {
            panic!("No overlay for {:?}", path);
        };
        overlay.virtual_attribute(name, true);
        AttributeBinding::for_entity(entity, self.column(path, name))
    }
}

pub fn session(monitor: Arc<dyn ProgressMonitor>) -> SimpleSession {
    SimpleSession::new(data_source(), monitor, Arc::new(DefaultValueHandler::default()))
}

pub const ORDERS: &[&str] = &["shop", "public", "orders"];
pub const CUSTOMERS: &[&str] = &["shop", "public", "customers"];
pub const EVENTS: &[&str] = &["shop", "audit", "events"];
