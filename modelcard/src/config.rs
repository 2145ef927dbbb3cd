//! Command-line configuration.
//!
//! Settings are stored in `.modelcard.toml` in the workspace directory.
//!
//! # Configuration File Format
//!
//! ```toml
//! store_path = "${workspaceFolder}/model_cards.json"
//! backup = false
//! default_template = "v1"
//! export_dir = "."
//! ```

use std::path::Path;

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default name of the configuration file.
pub const CONFIG_FILE_NAME: &str = ".modelcard.toml";

/// Settings for the `modelcard` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// JSON file holding the saved cards.
    ///
    /// `${workspaceFolder}` is replaced with the workspace directory.
    pub store_path: String,
    /// Copy the card file to a timestamped backup before every write.
    pub backup: bool,
    /// Template used by `new` when none is given (label, `vN` or version number).
    pub default_template: String,
    /// Directory where `export` writes cards when no output path is given.
    pub export_dir: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: "${workspaceFolder}/model_cards.json".to_string(),
            backup: false,
            default_template: "v1".to_string(),
            export_dir: ".".to_string(),
        }
    }
}

impl CliConfig {
    /// Reads the configuration, falling back to defaults when the file is
    /// missing or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// JSON Schema of the settings, used to edit them with the form engine.
    pub fn schema_json() -> anyhow::Result<String> {
        let schema = schemars::schema_for!(CliConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
