//! # ZMS Control
//!
//! Robot-side control core: drives the periphery from the remote joystick
//! link, executes host bridge instructions and relays logs to the host.
//!
//! # Usage
//!
//! ```bash
//! # Built-in settings on the simulation board
//! zms_control
//!
//! # Settings file, verbose logging, logs mirrored to the bridge host
//! zms_control --config robot.toml -v --log-to-bridge
//!
//! # JSON logs, custom listen addresses
//! zms_control --json --bridge-listen 0.0.0.0:5760 --remote-listen 0.0.0.0:5761
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};
use zms_common::config::{ConfigError, ConfigLoader, LogLevel};
use zms_common::consts::{DEFAULT_BRIDGE_ADDR, DEFAULT_CYCLE_TIME_MS, DEFAULT_REMOTE_ADDR};
use zms_common::settings::RobotSettings;
use zms_control::cycle::CycleRunner;
use zms_control::link::LinkSupervisor;
use zms_control::log_relay::{LogQueue, bridge_layer};
use zms_control::remote::RemoteDemux;
use zms_control::service::Service;
use zms_control::transport::{DEFAULT_READ_TIMEOUT, TcpBridgeStream, spawn_remote_listener};
use zms_hal::BoardRegistry;

/// ZMS Control - Zoomers robot control core
#[derive(Parser, Debug)]
#[command(name = "zms_control")]
#[command(author = "MISIS-Zoomers")]
#[command(version)]
#[command(about = "Robot control core: remote link, host bridge, actuators")]
#[command(long_about = None)]
struct Args {
    /// Path to robot settings (TOML). Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Board backend
    #[arg(short, long, default_value = "simulation")]
    board: String,

    /// Address the host bridge listens on
    #[arg(long, default_value = DEFAULT_BRIDGE_ADDR)]
    bridge_listen: String,

    /// Address the remote controller datagrams arrive on
    #[arg(long, default_value = DEFAULT_REMOTE_ADDR)]
    remote_listen: String,

    /// Poll loop period in milliseconds
    #[arg(long, default_value_t = DEFAULT_CYCLE_TIME_MS)]
    cycle_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Mirror INFO and above to the bridge host as Log telemetry
    #[arg(long)]
    log_to_bridge: bool,
}

fn main() {
    let args = Args::parse();
    let settings = load_settings(&args);

    let log_level = settings
        .as_ref()
        .map(|s| s.shared.log_level)
        .unwrap_or_default();
    let relay = setup_tracing(&args, log_level);

    info!("ZMS Control v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = settings
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|settings| run(&args, settings, relay));
    if let Err(e) = result {
        error!("FATAL: {e}");
        std::process::exit(1);
    }

    info!("ZMS Control shutdown complete");
}

fn load_settings(args: &Args) -> Result<RobotSettings, ConfigError> {
    let settings = match &args.config {
        Some(path) => RobotSettings::load(path)?,
        None => RobotSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

fn run(
    args: &Args,
    settings: RobotSettings,
    relay: Option<LogQueue>,
) -> Result<(), Box<dyn std::error::Error>> {
    match &args.config {
        Some(path) => info!("Loaded settings from {}", path.display()),
        None => warn!("No --config given, using built-in settings"),
    }
    info!("Robot '{}'", settings.shared.robot_name);

    // Board + devices.
    let registry = BoardRegistry::with_builtin();
    info!("Available boards: {:?}", registry.list_boards());
    let periphery = registry.open(&args.board, &settings)?;
    let board = periphery.board().clone();

    // Loop and shutdown flag.
    let mut runner = CycleRunner::new(Duration::from_millis(args.cycle_ms.max(1)));
    let running = runner.running_flag();
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    // Remote link.
    let link = Arc::new(LinkSupervisor::from_settings(&settings.link));
    let demux = RemoteDemux::new(link.clone(), board);
    let remote = spawn_remote_listener(args.remote_listen.as_str(), demux, running.clone())?;

    // Host bridge.
    let stream = TcpBridgeStream::bind(args.bridge_listen.as_str(), DEFAULT_READ_TIMEOUT)?;
    let mut service = Service::new(periphery, link, stream);
    if let Some(queue) = relay {
        info!("Relaying logs to the bridge host");
        service = service.with_log_relay(queue);
    }

    runner.run(|| {
        service.poll();
    });

    service.shutdown();
    running.store(false, Ordering::SeqCst);
    if remote.join().is_err() {
        warn!("Remote listener thread panicked");
    }

    let stats = service.bridge().stats();
    info!(
        "Bridge: {} received, {} dropped",
        stats.received, stats.dropped
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
///
/// Returns the relay queue when `--log-to-bridge` is set.
fn setup_tracing(args: &Args, configured: LogLevel) -> Option<LogQueue> {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.as_str().parse().unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let relay = args.log_to_bridge.then(LogQueue::default);

    let subscriber = tracing_subscriber::registry()
        .with(relay.clone().map(bridge_layer::<Registry>))
        .with(filter);

    if args.json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer()).init();
    }

    relay
}
