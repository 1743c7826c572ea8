use std::path::PathBuf;

use clap::Parser;

/// cloudterm: attach this terminal to a remote console session.
#[derive(Parser, Debug)]
#[command(name = "cloudterm", version, about)]
pub struct Args {
    /// WebSocket URI of the console session. Falls back to `endpoint.uri`
    /// from the config file.
    pub uri: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Handshake timeout in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: Option<u64>,
}

pub fn parse() -> Args {
    Args::parse()
}
