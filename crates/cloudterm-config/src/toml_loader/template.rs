//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# cloudterm configuration
# Only override what you want to change -- missing fields use defaults.

[endpoint]
# uri = "wss://console.example.com/terminals/<id>"
# connect_timeout_secs = 15   # 1-300
# ping_interval_secs = 0      # 0-3600, 0 disables keepalive pings

[logging]
# level = "INFO"              # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
