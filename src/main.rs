//! # Biospider Panel
//!
//! Host-side control panel for the Biospider walking robot.
//!
//! Reads commands from the console, sends them to the robot through an
//! ESP-NOW dongle, and reports the robot's telemetry through tracing.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use biospider_panel::bridge::{run_ping_loop, Clock, Dispatcher, MonotonicClock, Outbound, PanelContext, PingScheduler};
use biospider_panel::config::{Config, LoggingConfig};
use biospider_panel::display::{DisplaySink, TracingDisplay};
use biospider_panel::link::transport::Transport;
use biospider_panel::link::DongleLink;
use biospider_panel::telemetry::TelemetryParser;
use biospider_panel::ui::{IntentAdapter, UiEvent};

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for daily log files
const LOG_FILE_PREFIX: &str = "biospider-panel.log";

/// Peers registered with the dongle (the robot)
const PEER_COUNT: u32 = 1;

fn config_path(mut args: impl Iterator<Item = String>) -> String {
    args.nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Filter from `RUST_LOG` when it is set and valid, else from the configured level
fn log_filter(env: Option<&str>, level: &str) -> Result<EnvFilter> {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .map_or_else(|| EnvFilter::try_new(level), Ok)
        .with_context(|| format!("Invalid log level '{}'", level))
}

/// Set up console logging plus an optional daily log file.
///
/// The returned guard must live as long as file logging should flush.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(env.as_deref(), &logging.level)?;

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Read stdin on a plain thread so a pending read never holds up shutdown
fn spawn_console_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!("Console read failed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Feed console lines to the adapter as UI events.
///
/// Once stdin closes the panel keeps running headless.
async fn run_console<D, T, C>(adapter: &IntentAdapter<D, T, C>, mut lines: mpsc::UnboundedReceiver<String>)
where
    D: DisplaySink,
    T: Transport,
    C: Clock,
{
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<UiEvent>() {
            Ok(event) => adapter.handle(event).await,
            Err(e) => warn!("Ignoring console input: {}", e),
        }
    }

    info!("Console input closed, continuing without it");
    std::future::pending::<()>().await
}

/// Main entry point for the Biospider panel
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the ESP-NOW dongle and mark the radio up
///
/// 2. **Main Loop**
///    - Dispatch received frames into the panel
///    - Tick the SPM ping scheduler
///    - Turn console commands into robot commands
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - The configuration file exists but is invalid
/// - No dongle can be opened
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Console commands: `up`, `down`, `left`, `right`, `stop`, `speed 40`,
/// `preset 1`, `trot`, `scan`, `moonwalk`, `spm`.
#[tokio::main]
async fn main() -> Result<()> {
    let path = config_path(std::env::args());
    let config = Config::load_or_default(&path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;

    let _log_guard = init_tracing(&config.logging)?;

    info!("Biospider panel v{} starting...", env!("CARGO_PKG_VERSION"));

    let link = DongleLink::open(&config.link.port, config.link.baud_rate)?;
    info!("Dongle link opened at: {}", link.device_path());
    let (writer, mut reader) = link.split();

    let ctx = Arc::new(PanelContext::new(
        TracingDisplay::default(),
        config.bridge.lock_timeout(),
        PingScheduler::new(config.bridge.ping_interval_ms, config.bridge.spm_window_ms),
    ));
    ctx.set_speed(config.panel.initial_speed);
    ctx.update_connection(|c| c.radio_up(PEER_COUNT));
    ctx.show_ready().await;

    let outbound = Arc::new(Outbound::new(writer, config.link.peer_mac));
    let clock = Arc::new(MonotonicClock::new());

    let dispatcher = Dispatcher::new(
        ctx.clone(),
        TelemetryParser::new(config.bridge.frame_text_limit),
        config.ranging.model(),
    );
    let adapter = IntentAdapter::new(ctx.clone(), outbound.clone(), clock.clone());

    info!("Peer: {}, speed {}%", outbound.peer(), ctx.speed());
    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = dispatcher.run(&mut reader) => match result {
            Ok(()) => warn!("Dongle link closed"),
            Err(e) => error!("Dongle link failed: {}", e),
        },

        _ = run_ping_loop(ctx.as_ref(), outbound.as_ref(), clock.as_ref(), config.bridge.tick()) => {}

        _ = run_console(&adapter, spawn_console_reader()) => {}

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    info!("Last telemetry: {}", ctx.sample());
    Ok(())
}
