//! Reading `config.toml` from an explicit path or the per-user location.

use std::io::ErrorKind;
use std::path::Path;

use cloudterm_common::ConfigError;
use tracing::info;

use super::paths::{create_default_config, default_config_path};
use crate::schema::CloudtermConfig;

/// Parse the TOML file at `path`. Fields the file leaves out keep their
/// defaults; range checks happen in [`crate::validate`].
pub fn load_from_path(path: &Path) -> Result<CloudtermConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let config = toml::from_str::<CloudtermConfig>(&raw)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Load the per-user config, writing the commented template there first
/// when no file exists yet.
pub fn load_default() -> Result<CloudtermConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            Ok(CloudtermConfig::default())
        }
        other => other,
    }
}
