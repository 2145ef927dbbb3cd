//! Application context and state management.
//!
//! This module provides the [`AppContext`] type which holds the workspace
//! location and the loaded settings, and hands out the card store.

use std::path::{Path, PathBuf};

use cardform::store::JsonFileStore;

use crate::config::{CONFIG_FILE_NAME, CliConfig};

/// The main application context holding all state.
#[derive(Debug, Default, Clone)]
pub struct AppContext {
    /// Workspace root directory.
    pub workspace: PathBuf,
    /// Path of the settings file.
    pub config_path: PathBuf,
    /// Loaded settings.
    pub config: CliConfig,
}

impl AppContext {
    /// Loads the settings for `workspace`.
    ///
    /// # Arguments
    ///
    /// * `workspace` - Directory that relative paths are resolved against.
    /// * `config_path` - Settings file. Defaults to `.modelcard.toml` in the
    ///   workspace directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing settings file cannot be parsed.
    pub fn load(workspace: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = config_path.unwrap_or_else(|| workspace.join(CONFIG_FILE_NAME));
        let config = CliConfig::load(&config_path)?;
        debug!("settings from {}: {config:?}", config_path.display());
        Ok(Self {
            workspace,
            config_path,
            config,
        })
    }

    /// Replaces variable placeholders in a string.
    ///
    /// Currently supports `${workspaceFolder}` which is replaced with the
    /// workspace directory path.
    pub fn value_replace_with_var<S>(&self, value: S) -> String
    where
        S: AsRef<std::ffi::OsStr>,
    {
        let raw = value.as_ref().to_string_lossy();
        raw.replace(
            "${workspaceFolder}",
            format!("{}", self.workspace.display()).as_ref(),
        )
    }

    /// Resolves a configured path: variables are expanded and relative paths
    /// are taken from the workspace.
    pub fn resolve_path(&self, configured: &str) -> PathBuf {
        let expanded = PathBuf::from(self.value_replace_with_var(configured));
        if expanded.is_absolute() {
            expanded
        } else {
            self.workspace.join(expanded)
        }
    }

    /// Path of the card store file.
    pub fn store_path(&self) -> PathBuf {
        self.resolve_path(&self.config.store_path)
    }

    /// Opens the card store described by the settings.
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.store_path()).with_backup(self.config.backup)
    }

    /// Directory used for exports without an explicit output path.
    pub fn export_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.export_dir)
    }

    /// Writes the settings back to [`AppContext::config_path`].
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.save(&self.config_path)
    }

    /// Workspace directory.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_workspace() {
        let ctx = AppContext {
            workspace: PathBuf::from("/work"),
            ..Default::default()
        };
        assert_eq!(ctx.store_path(), PathBuf::from("/work/model_cards.json"));
        assert_eq!(ctx.export_dir(), PathBuf::from("/work/."));
        assert_eq!(ctx.resolve_path("cards/all.json"), PathBuf::from("/work/cards/all.json"));
        assert_eq!(ctx.resolve_path("/abs/cards.json"), PathBuf::from("/abs/cards.json"));
    }

    #[test]
    fn test_load_uses_workspace_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "store_path = \"data/cards.json\"\nbackup = true\n",
        )
        .unwrap();
        let ctx = AppContext::load(dir.path().to_path_buf(), None).unwrap();
        assert!(ctx.config.backup);
        assert_eq!(ctx.store_path(), dir.path().join("data/cards.json"));
        assert_eq!(ctx.store().path(), dir.path().join("data/cards.json"));
    }
}
