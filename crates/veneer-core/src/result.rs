//! Result sets, sessions and value handlers.
//!
//! The overlay layer never executes SQL. It reads rows that a caller already
//! obtained, through these interfaces.

use crate::config::DictionaryConfig;
use crate::error::SourceError;
use crate::identity::DataSourceId;
use crate::progress::ProgressMonitor;
use crate::schema::AttributeMeta;
use serde_json::Value;
use std::sync::Arc;

/// Display string used for null values.
pub const NULL_VALUE_LABEL: &str = "[NULL]";

/// Target of a value-to-text conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayFormat {
    /// Human-oriented rendering for grids and labels.
    Ui,
    /// Rendering suitable for an inline editor.
    Edit,
    /// The value's natural textual form.
    #[default]
    Native,
}

/// Forward-only cursor over tabular results.
pub trait ResultSet {
    /// Column metadata of the result, in column order.
    fn columns(&self) -> Result<Vec<AttributeMeta>, SourceError>;

    /// Advance to the next row. Returns `false` once exhausted.
    fn next_row(&mut self) -> Result<bool, SourceError>;

    /// Raw value of a column in the current row.
    fn column_value(&self, index: usize) -> Result<Value, SourceError>;
}

/// Converts raw result values into values and display strings.
pub trait ValueHandler: Send + Sync {
    fn fetch_value(
        &self,
        session: &dyn Session,
        results: &dyn ResultSet,
        attribute: &AttributeMeta,
        index: usize,
    ) -> Result<Value, SourceError>;

    fn display_string(&self, attribute: &AttributeMeta, value: &Value, format: DisplayFormat)
    -> String;
}

/// Execution context of a caller reading results.
pub trait Session {
    fn data_source(&self) -> &DataSourceId;

    fn progress(&self) -> &dyn ProgressMonitor;

    /// Value handler for a result column.
    fn value_handler(&self, attribute: &AttributeMeta) -> Arc<dyn ValueHandler>;
}

/// Value handler that passes raw values through unchanged.
#[derive(Debug, Clone)]
pub struct DefaultValueHandler {
    null_label: String,
}

impl DefaultValueHandler {
    pub fn new(null_label: impl Into<String>) -> Self {
        Self {
            null_label: null_label.into(),
        }
    }

    /// Handler showing nulls with the configured dictionary null label.
    pub fn from_config(config: &DictionaryConfig) -> Self {
        Self::new(config.null_label.clone())
    }
}

impl Default for DefaultValueHandler {
    fn default() -> Self {
        Self::new(NULL_VALUE_LABEL)
    }
}

impl ValueHandler for DefaultValueHandler {
    fn fetch_value(
        &self,
        _session: &dyn Session,
        results: &dyn ResultSet,
        _attribute: &AttributeMeta,
        index: usize,
    ) -> Result<Value, SourceError> {
        results.column_value(index)
    }

    fn display_string(
        &self,
        _attribute: &AttributeMeta,
        value: &Value,
        format: DisplayFormat,
    ) -> String {
        match value {
            Value::Null => self.null_label.clone(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            // Structured values keep their JSON text; editors get it pretty-printed.
            other if format == DisplayFormat::Edit => {
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())
            }
            other => other.to_string(),
        }
    }
}

/// Session over a fixed value handler and progress monitor.
#[derive(Clone)]
pub struct SimpleSession {
    data_source: DataSourceId,
    monitor: Arc<dyn ProgressMonitor>,
    handler: Arc<dyn ValueHandler>,
}

impl SimpleSession {
    pub fn new(
        data_source: DataSourceId,
        monitor: Arc<dyn ProgressMonitor>,
        handler: Arc<dyn ValueHandler>,
    ) -> Self {
        Self {
            data_source,
            monitor,
            handler,
        }
    }
}

impl Session for SimpleSession {
    fn data_source(&self) -> &DataSourceId {
        &self.data_source
    }

    fn progress(&self) -> &dyn ProgressMonitor {
        self.monitor.as_ref()
    }

    fn value_handler(&self, _attribute: &AttributeMeta) -> Arc<dyn ValueHandler> {
        Arc::clone(&self.handler)
    }
}

/// Result set over rows held in memory.
#[derive(Debug, Clone)]
pub struct MemoryResultSet {
    columns: Vec<AttributeMeta>,
    rows: Vec<Vec<Value>>,
    cursor: Option<usize>,
}

impl MemoryResultSet {
    pub fn new(columns: Vec<AttributeMeta>, rows: Vec<Vec<Value>>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_ordinal(i))
            .collect();
        Self {
            columns,
            rows,
            cursor: None,
        }
    }

    /// Number of rows consumed so far.
    pub fn position(&self) -> usize {
        self.cursor.map(|c| c + 1).unwrap_or(0)
    }
}

impl ResultSet for MemoryResultSet {
    fn columns(&self) -> Result<Vec<AttributeMeta>, SourceError> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self) -> Result<bool, SourceError> {
        let next = self.cursor.map(|c| c + 1).unwrap_or(0);
        if next >= self.rows.len() {
            self.cursor = Some(self.rows.len());
            return Ok(false);
        }
        self.cursor = Some(next);
        Ok(true)
    }

    fn column_value(&self, index: usize) -> Result<Value, SourceError> {
        let row = self
            .cursor
            .and_then(|c| self.rows.get(c))
            .ok_or_else(|| SourceError::ResultSet("no current row".to_string()))?;

        row.get(index).cloned().ok_or_else(|| SourceError::ValueFetch {
            column: self
                .columns
                .get(index)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("#{}", index)),
            reason: "column index out of range".to_string(),
        })
    }
}
