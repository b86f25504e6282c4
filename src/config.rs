//! Configuration management and validation.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line overrides applied by the CLI.

use crate::constants::{
    DEFAULT_EXPORT_FILENAME, DEFAULT_IDENTIFIER_HUMAN, DEFAULT_SEARCH_LIMIT, ENV_DATASET_ID,
    ENV_IDENTIFIER_HUMAN,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const MAX_IDENTIFIER_LENGTH: usize = 32;

/// Settings for identification commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    /// Initials recorded as `identifier_human` on user identifications
    pub identifier_human: String,

    /// JSON file of reference species lists
    pub species_list_path: Option<PathBuf>,

    /// List searched when `--list-id` is not given
    pub default_species_list: Option<String>,

    /// Maximum candidates requested from a species list search
    pub search_limit: usize,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            identifier_human: DEFAULT_IDENTIFIER_HUMAN.to_string(),
            species_list_path: None,
            default_species_list: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Settings for the Darwin Core export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Dataset id; the first night path segment is used when unset
    pub dataset_id: Option<String>,

    /// File name of the CSV written into the night directory
    pub output_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dataset_id: None,
            output_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            structured: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub identification: IdentificationConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// `~/.config/taxon-annotator/config.toml` on Linux, platform equivalent elsewhere
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("taxon-annotator").join("config.toml"))
            .ok_or_else(|| Error::configuration("Could not determine configuration directory"))
    }

    /// Parse configuration from TOML text; missing keys take defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml_str(&text).map_err(|e| {
            Error::configuration(format!("{} ({})", e, path.display()))
        })
    }

    /// Defaults, then the optional file, then process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(identifier) = lookup(ENV_IDENTIFIER_HUMAN) {
            debug!("Identifier overridden by {}", ENV_IDENTIFIER_HUMAN);
            self.identification.identifier_human = identifier;
        }
        if let Some(dataset_id) = lookup(ENV_DATASET_ID).filter(|id| !id.trim().is_empty()) {
            debug!("Dataset id overridden by {}", ENV_DATASET_ID);
            self.export.dataset_id = Some(dataset_id);
        }
    }

    /// Set the identifier initials
    pub fn with_identifier(mut self, identifier_human: impl Into<String>) -> Self {
        self.identification.identifier_human = identifier_human.into();
        self
    }

    /// Set the export dataset id
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.export.dataset_id = Some(dataset_id.into());
        self
    }

    /// Set the species list file
    pub fn with_species_list_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.identification.species_list_path = Some(path.into());
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.identification.search_limit == 0 {
            return Err(Error::configuration(
                "identification.search_limit must be at least 1",
            ));
        }

        let identifier = self.identification.identifier_human.trim();
        if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
            return Err(Error::configuration(format!(
                "identification.identifier_human is longer than {} characters",
                MAX_IDENTIFIER_LENGTH
            )));
        }
        if identifier.chars().any(char::is_control) {
            return Err(Error::configuration(
                "identification.identifier_human contains control characters",
            ));
        }

        let filename = self.export.output_filename.trim();
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(Error::configuration(format!(
                "export.output_filename must be a plain file name, got '{}'",
                self.export.output_filename
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "logging.level must be one of {}, got '{}'",
                VALID_LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }
}
