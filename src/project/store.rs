// src/project/store.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::ProjectConfig;

use super::gitignore::ensure_gitignore_entry;
use super::history::trim_history;

/// File name of the per-project record, relative to the project directory.
pub const CONFIG_FILE_NAME: &str = ".interactive-feedback-config.json";

/// Loads and saves [`ProjectConfig`] records.
///
/// Plain read-modify-write with no locking; one feedback round-trip runs
/// at a time.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    fs: Arc<dyn FileSystem>,
    history_limit: usize,
}

impl ProjectStore {
    pub fn new(fs: Arc<dyn FileSystem>, history_limit: usize) -> Self {
        Self { fs, history_limit }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the record for `project_dir`.
    ///
    /// A missing or unparsable file yields the default record.
    pub fn load(&self, project_dir: &Path) -> ProjectConfig {
        let path = Self::config_path(project_dir);
        if !self.fs.exists(&path) {
            debug!(path = ?path, "no project config; using defaults");
            return ProjectConfig::default();
        }

        let parsed = self
            .fs
            .read_to_string(&path)
            .and_then(|raw| {
                serde_json::from_str::<ProjectConfig>(&raw).map_err(anyhow::Error::from)
            });

        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!(path = ?path, error = %e, "unreadable project config; using defaults");
                ProjectConfig::default()
            }
        }
    }

    /// Trim the history to the configured limit and write the record.
    pub fn save(&self, project_dir: &Path, config: &mut ProjectConfig) -> Result<()> {
        trim_history(&mut config.conversation_history, self.history_limit);

        let path = Self::config_path(project_dir);
        let data = serde_json::to_string_pretty(config)?;
        self.fs
            .write(&path, data.as_bytes())
            .with_context(|| format!("saving project config to {:?}", path))?;

        debug!(path = ?path, entries = config.conversation_history.len(), "project config saved");
        Ok(())
    }

    /// Keep the record file out of version control.
    pub fn ensure_ignored(&self, project_dir: &Path) -> Result<bool> {
        Ok(ensure_gitignore_entry(self.fs.as_ref(), project_dir, CONFIG_FILE_NAME)?)
    }
}
