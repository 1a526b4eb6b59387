//! Overlay configuration.
//!
//! Configuration is a small YAML document; every field has a default, so an
//! empty document is a valid configuration:
//!
//! ```yaml
//! dictionary:
//!   label_separator: " "
//!   null_label: "[NULL]"
//! description:
//!   preferred_columns: [name, title, label, description]
//! ```

use crate::result::NULL_VALUE_LABEL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete overlay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Dictionary (lookup value) reading.
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Default description column selection.
    #[serde(default)]
    pub description: DescriptionConfig,
}

/// Dictionary reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Separator between description column values in a composed label.
    #[serde(default = "default_label_separator")]
    pub label_separator: String,

    /// Display string of a null value.
    #[serde(default = "default_null_label")]
    pub null_label: String,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            label_separator: default_label_separator(),
            null_label: default_null_label(),
        }
    }
}

/// Configuration of the default description column heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionConfig {
    /// Column names tried in order (case-insensitive) before falling back to
    /// the first text column.
    #[serde(default = "default_preferred_columns")]
    pub preferred_columns: Vec<String>,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            preferred_columns: default_preferred_columns(),
        }
    }
}

fn default_label_separator() -> String {
    " ".to_string()
}

fn default_null_label() -> String {
    NULL_VALUE_LABEL.to_string()
}

fn default_preferred_columns() -> Vec<String> {
    ["name", "title", "label", "description"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OverlayConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self
            .description
            .preferred_columns
            .iter()
            .position(|c| c.trim().is_empty())
        {
            return Err(ConfigError::Config(format!(
                "description.preferred_columns[{}] is blank",
                pos
            )));
        }
        Ok(())
    }
}
