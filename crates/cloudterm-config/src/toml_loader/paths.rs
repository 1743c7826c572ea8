//! Where the per-user config lives, and seeding it from the template.

use std::path::{Path, PathBuf};

use cloudterm_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// `<platform config dir>/cloudterm/config.toml`, e.g.
/// `~/.config/cloudterm/config.toml` on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("cloudterm").join("config.toml"))
        .ok_or_else(|| {
            ConfigError::ParseError("no per-user config directory on this platform".into())
        })
}

/// Write the commented template to `path`, creating missing parent
/// directories. Overwrites an existing file.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_failure =
        |what: &str, e: std::io::Error| ConfigError::ParseError(format!("{what}: {e}"));

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| io_failure(&format!("cannot create {}", dir.display()), e))?;
    }
    std::fs::write(path, default_config_toml())
        .map_err(|e| io_failure(&format!("cannot write {}", path.display()), e))?;

    info!(path = %path.display(), "Wrote default config");
    Ok(())
}
