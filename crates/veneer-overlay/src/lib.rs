//! # veneer-overlay
//!
//! Virtual metadata overlays for schema objects.
//!
//! Users can declare metadata that the data source does not know about:
//! extra unique keys, foreign keys between tables that have none, the columns
//! that describe a lookup value, value transformers for a column. This crate
//! stores those declarations next to the real schema and answers questions
//! that need both:
//!
//! - Map a real entity, attribute or container to its overlay
//!   ([`OverlayResolver::resolve_virtual_entity`] and friends)
//! - Attach overlays to ad-hoc containers such as custom queries through the
//!   [`OrphanCache`]
//! - Find the transform settings that apply to an attribute, walking up
//!   attribute, entity, containers and model
//! - Select the value transformers for an attribute
//! - Read dictionary (lookup) rows from a key/description result set
//! - Merge real constraints and associations with declared ones
//! - Unwrap a virtual entity to its real entity
//!
//! ## Inheritance
//!
//! | Level      | Settings found on             |
//! |------------|-------------------------------|
//! | Attribute  | [`VirtualAttribute`]          |
//! | Entity     | [`VirtualEntity`]             |
//! | Container  | [`VirtualContainer`] (schema, catalog), innermost first |
//! | Model      | [`VirtualModel`]              |
//!
//! The first level that carries settings wins.

pub mod dictionary;
pub mod error;
pub mod inheritance;
pub mod merge;
pub mod model;
pub mod object;
pub mod orphan;
pub mod real;
pub mod resolver;
pub mod settings;
pub mod transformers;

pub use dictionary::{DictionaryReader, LabelValuePair};
pub use error::{OverlayError, Result};
pub use inheritance::resolve_transform_settings;
pub use merge::Overlaid;
pub use model::{VirtualAttribute, VirtualContainer, VirtualEntity, VirtualModel};
pub use object::{
    AttributeBinding, ContainerRef, EntityRef, RealObject, SchemaObjectRef, VirtualObject,
};
pub use orphan::OrphanCache;
pub use real::{require_real_entity, try_real_entity};
pub use resolver::OverlayResolver;
pub use settings::{SettingsSnapshot, TransformSettings, TransformerFilter};
