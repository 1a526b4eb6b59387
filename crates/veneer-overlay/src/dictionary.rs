//! Reading lookup rows for foreign-key style value pickers.

use crate::error::{OverlayError, Result};
use crate::object::EntityRef;
use crate::resolver::OverlayResolver;
use serde::Serialize;
use std::sync::Arc;
use veneer_core::{
    AttributeMeta, DataKind, DefaultValueHandler, DictionaryConfig, DisplayFormat,
    ProgressMonitor, ResultSet, SchemaEntity, Session, Value, ValueHandler,
};

/// One dictionary row: a display label and the key value it stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelValuePair {
    pub label: String,
    pub value: Value,
}

/// Turns a key/description result set into label/value pairs.
///
/// The first column holds the key; any further columns describe it.
#[derive(Debug, Clone)]
pub struct DictionaryReader {
    label_separator: String,
}

impl DictionaryReader {
    pub fn new(config: &DictionaryConfig) -> Self {
        Self {
            label_separator: config.label_separator.clone(),
        }
    }

    /// Read every row of `results`, in result order.
    ///
    /// At most one null-keyed row is kept. Cancellation is checked once per
    /// row; a canceled scan returns the rows read so far.
    pub fn read_rows(
        &self,
        session: &dyn Session,
        key_attribute: &AttributeMeta,
        key_handler: &dyn ValueHandler,
        results: &mut dyn ResultSet,
    ) -> Result<Vec<LabelValuePair>> {
        let columns = results.columns().map_err(OverlayError::DataAccess)?;
        let handlers: Vec<Arc<dyn ValueHandler>> = columns
            .iter()
            .map(|column| session.value_handler(column))
            .collect();

        let mut rows = Vec::new();
        let mut has_nulls = false;
        while results.next_row().map_err(OverlayError::DataAccess)? {
            if session.progress().is_canceled() {
                tracing::debug!(
                    data_source = %session.data_source(),
                    rows = rows.len(),
                    "Dictionary scan canceled"
                );
                break;
            }

            let value = key_handler
                .fetch_value(session, &*results, key_attribute, 0)
                .map_err(OverlayError::DataAccess)?;
            if value.is_null() {
                if has_nulls {
                    continue;
                }
                has_nulls = true;
            }

            let label = if columns.len() > 1 {
                self.describe(session, &columns, &handlers, &*results)?
            } else {
                key_handler.display_string(key_attribute, &value, DisplayFormat::Native)
            };
            rows.push(LabelValuePair { label, value });
        }
        Ok(rows)
    }

    fn describe(
        &self,
        session: &dyn Session,
        columns: &[AttributeMeta],
        handlers: &[Arc<dyn ValueHandler>],
        results: &dyn ResultSet,
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(columns.len() - 1);
        for (index, (column, handler)) in columns.iter().zip(handlers).enumerate().skip(1) {
            let value = handler
                .fetch_value(session, results, column, index)
                .map_err(OverlayError::DataAccess)?;
            parts.push(handler.display_string(column, &value, DisplayFormat::Native));
        }
        Ok(parts.join(&self.label_separator))
    }
}

impl OverlayResolver {
    /// Dictionary reader using the resolver's configuration.
    pub fn dictionary_reader(&self) -> DictionaryReader {
        DictionaryReader::new(&self.config().dictionary)
    }

    /// Value handler showing nulls with the configured null label.
    pub fn dictionary_value_handler(&self) -> DefaultValueHandler {
        DefaultValueHandler::from_config(&self.config().dictionary)
    }

    /// Columns used to describe values of `attribute` in a dictionary of
    /// `entity`, as a comma-separated spec.
    ///
    /// A spec declared on the virtual entity wins. Otherwise the first real
    /// column matching a configured hint is used, then the first text column
    /// other than the key itself.
    pub fn dictionary_description_columns(
        &self,
        entity: &EntityRef,
        attribute: &AttributeMeta,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Option<String>> {
        let overlay = self.resolve_virtual_entity(entity, false);
        if let Some(spec) = overlay.as_ref().and_then(|v| v.description_columns()) {
            return Ok(Some(spec));
        }

        let real: Arc<dyn SchemaEntity> = match entity {
            EntityRef::Real(real) => Arc::clone(real),
            EntityRef::Virtual(v) => {
                match v.real_entity(monitor).map_err(OverlayError::MetadataAccess)? {
                    Some(real) => real,
                    None => return Ok(None),
                }
            }
        };
        let candidates: Vec<AttributeMeta> = real
            .attributes(monitor)
            .map_err(OverlayError::MetadataAccess)?
            .into_iter()
            .filter(|a| !a.name.eq_ignore_ascii_case(&attribute.name))
            .collect();

        let hinted = self
            .config()
            .description
            .preferred_columns
            .iter()
            .find_map(|hint| candidates.iter().find(|a| a.name.eq_ignore_ascii_case(hint)));
        let chosen = hinted.or_else(|| {
            candidates
                .iter()
                .find(|a| a.data_kind() == DataKind::String)
        });
        Ok(chosen.map(|a| a.name.clone()))
    }
}
