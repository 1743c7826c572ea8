//! cloudterm configuration.
//!
//! TOML configuration for the `cloudterm` host program. Every section uses
//! serde defaults so an empty or partial file is valid.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{CloudtermConfig, EndpointConfig, LogLevel, LoggingConfig};
pub use toml_loader::{create_default_config, default_config_path, load_default, load_from_path};
pub use validation::validate;

use std::path::Path;

use cloudterm_common::ConfigError;

/// Load config from `path` if given, otherwise from the platform default
/// location, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<CloudtermConfig, ConfigError> {
    let config = match path {
        Some(path) => load_from_path(path)?,
        None => load_default()?,
    };
    validate(&config)?;
    Ok(config)
}
