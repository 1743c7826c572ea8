//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` instead of stopping at
//! the first one.

use cloudterm_common::ConfigError;

use crate::schema::CloudtermConfig;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CloudtermConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_endpoint(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_endpoint(errors: &mut Vec<String>, config: &CloudtermConfig) {
    let endpoint = &config.endpoint;

    if let Some(uri) = &endpoint.uri {
        let uri = uri.trim();
        if uri.is_empty() {
            errors.push("endpoint.uri is empty".into());
        } else if !(uri.starts_with("ws://") || uri.starts_with("wss://")) {
            errors.push(format!(
                "endpoint.uri must start with ws:// or wss://, got '{}'",
                scheme_of(uri)
            ));
        }
    }

    validate_range(
        errors,
        "endpoint.connect_timeout_secs",
        endpoint.connect_timeout_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "endpoint.ping_interval_secs",
        endpoint.ping_interval_secs,
        0,
        3600,
    );
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Everything before `://`, so tokens in the rest never reach a log line.
fn scheme_of(uri: &str) -> &str {
    uri.split_once("://").map_or(uri, |(scheme, _)| scheme)
}
