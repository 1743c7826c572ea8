//! cloudterm: attach the local terminal to a remote console session.
//!
//! stdin is forwarded to the session and the session output is copied to
//! stdout. Logs go to stderr so they never interleave with console output.

mod cli;
mod terminal;

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cloudterm_bridge::{main_queue, MainQueue, SessionBridge, SessionState};
use cloudterm_config::CloudtermConfig;
use cloudterm_socket::SocketOptions;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

const LOOP_POLL: Duration = Duration::from_millis(50);

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn socket_options(config: &CloudtermConfig, args: &cli::Args) -> SocketOptions {
    let connect_timeout = args
        .connect_timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.endpoint.connect_timeout());
    SocketOptions {
        connect_timeout,
        ping_interval: config.endpoint.ping_interval(),
        ..SocketOptions::default()
    }
}

/// Build the runtime and bridge and start the handshake.
fn start_session(
    uri: &str,
    options: SocketOptions,
    queue: MainQueue,
) -> cloudterm_common::Result<(Runtime, Arc<SessionBridge>)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let bridge = SessionBridge::with_options(uri, options, Arc::new(queue))?;
    tracing::info!(
        session = %bridge.id(),
        "cloudterm v{} connecting",
        env!("CARGO_PKG_VERSION")
    );
    bridge.connect_on(runtime.handle())?;
    Ok((runtime, bridge))
}

/// Block until the session either opens or closes without opening.
fn wait_for_open(runtime: &Runtime, bridge: &SessionBridge) -> bool {
    let mut state = bridge.subscribe_state();
    runtime.block_on(async {
        match state
            .wait_for(|s| matches!(s, SessionState::Open | SessionState::Closed))
            .await
        {
            Ok(s) => *s == SessionState::Open,
            Err(_) => false,
        }
    })
}

fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = cloudterm_config::load_config(args.config.as_deref());
    let level = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.as_filter().to_string(),
        (None, Err(_)) => "info".to_string(),
    };
    init_logging(&level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) if args.config.is_some() => {
            tracing::error!(error = %e, "Config load failed");
            return ExitCode::from(2);
        }
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {e}");
            CloudtermConfig::default()
        }
    };

    let Some(uri) = args.uri.clone().or_else(|| config.endpoint.uri.clone()) else {
        tracing::error!("No console URI given on the command line or in endpoint.uri");
        return ExitCode::from(2);
    };

    let (queue, main_loop) = main_queue();
    let (runtime, bridge) = match start_session(&uri, socket_options(&config, &args), queue) {
        Ok(started) => started,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start console session");
            return ExitCode::FAILURE;
        }
    };

    if !wait_for_open(&runtime, &bridge) {
        main_loop.run_pending();
        tracing::error!(session = %bridge.id(), "Console session never opened");
        return ExitCode::FAILURE;
    }

    let inbound = bridge.inbound();
    let output = thread::spawn(move || {
        if let Err(e) = terminal::pump_output(inbound, std::io::stdout().lock()) {
            tracing::warn!(error = %e, "Writing console output failed");
        }
    });

    // Detached: a blocked stdin read must not hold up exit.
    let input_bridge = Arc::clone(&bridge);
    thread::spawn(move || {
        match terminal::pump_input(std::io::stdin().lock(), input_bridge.outbound()) {
            Ok(bytes) => tracing::debug!(bytes, "Local input ended"),
            Err(e) => tracing::warn!(error = %e, "Reading local input failed"),
        }
        input_bridge.close("local input closed");
    });

    main_loop.run_until(|| output.is_finished(), LOOP_POLL);
    if output.join().is_err() {
        tracing::warn!("Console output thread panicked");
    }

    runtime.shutdown_timeout(Duration::from_secs(1));
    tracing::info!(session = %bridge.id(), "Shutdown complete");
    ExitCode::SUCCESS
}
