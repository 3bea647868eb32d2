// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{RawServerConfig, ServerConfig};
use crate::errors::Result;

/// Load a settings file from a given path and return the raw `RawServerConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawServerConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawServerConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a settings file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ServerConfig::try_from(raw_config)?;
    Ok(config)
}

/// Load `path` if given, otherwise fall back to built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ServerConfig> {
    match path {
        Some(path) => {
            debug!(path = ?path, "loading server settings");
            load_and_validate(path)
        }
        None => Ok(ServerConfig::default()),
    }
}
