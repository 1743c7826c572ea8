//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod endpoint;
mod logging;

pub use endpoint::*;
pub use logging::*;

use serde::{Deserialize, Serialize};

/// Root configuration for cloudterm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudtermConfig {
    pub endpoint: EndpointConfig,
    pub logging: LoggingConfig,
}
