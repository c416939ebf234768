//! # ZMS Bridge Client
//!
//! Host-side command line client for the robot bridge. Encodes
//! instructions and decodes telemetry with the shared codec.
//!
//! # Usage
//!
//! ```bash
//! zms_bridge_client millis
//! zms_bridge_client --addr 192.168.4.1:5760 distances
//! zms_bridge_client manipulator 120 off
//! zms_bridge_client motors 500 -500
//! zms_bridge_client monitor --distances-every-ms 250
//! ```

mod connection;

use clap::{Parser, Subcommand};
use connection::{HostStream, request};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use zms_common::bridge::{AxisCommand, BridgeChannel, Instruction, Telemetry};
use zms_common::consts::{AXIS_DISABLE_CODE, DEFAULT_BRIDGE_ADDR, MOTOR_COMMAND_FULL_SCALE};

/// ZMS Bridge Client - talk to the robot over the host bridge
#[derive(Parser, Debug)]
#[command(name = "zms_bridge_client")]
#[command(author = "MISIS-Zoomers")]
#[command(version)]
#[command(about = "Send bridge instructions and print telemetry")]
#[command(long_about = None)]
struct Args {
    /// Robot bridge address
    #[arg(short, long, default_value = DEFAULT_BRIDGE_ADDR)]
    addr: String,

    /// Reply timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the robot's uptime
    Millis,
    /// Print both distance readings
    Distances,
    /// Move the manipulator; each axis takes 0..=180 or "off"
    Manipulator {
        /// Arm angle or "off"
        #[arg(value_parser = parse_axis, allow_hyphen_values = true)]
        arm: AxisCommand,
        /// Claw angle or "off"
        #[arg(value_parser = parse_axis, allow_hyphen_values = true)]
        claw: AxisCommand,
    },
    /// Drive both motors, -1000..=1000 each
    Motors {
        /// Left motor command
        #[arg(allow_hyphen_values = true)]
        left: i16,
        /// Right motor command
        #[arg(allow_hyphen_values = true)]
        right: i16,
    },
    /// Print telemetry until interrupted
    Monitor {
        /// Also ask for distances at this period
        #[arg(long)]
        distances_every_ms: Option<u64>,
    },
}

fn parse_axis(s: &str) -> Result<AxisCommand, String> {
    if s.eq_ignore_ascii_case("off") {
        return Ok(AxisCommand::Disable);
    }
    match s.parse::<u8>() {
        Ok(angle) if angle != AXIS_DISABLE_CODE && angle <= 180 => Ok(AxisCommand::Angle(angle)),
        _ => Err(format!("expected 0..=180 or \"off\", got {s:?}")),
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = Duration::from_millis(args.timeout_ms);
    let stream = HostStream::connect(args.addr.as_str(), timeout)?;
    info!("Connected to {}", args.addr);
    let mut channel = BridgeChannel::new(stream);

    match &args.command {
        Command::Millis => {
            let millis = request(
                &mut channel,
                &Instruction::GetMillis,
                timeout,
                |t| match t {
                    Telemetry::Millis(ms) => Some(*ms),
                    _ => None,
                },
                print_telemetry,
            )?;
            println!("{millis} ms");
        }
        Command::Distances => {
            let (left, right) = request(
                &mut channel,
                &Instruction::GetDistances,
                timeout,
                |t| match t {
                    Telemetry::Distances { left, right } => Some((*left, *right)),
                    _ => None,
                },
                print_telemetry,
            )?;
            println!("left {} mm, right {} mm", left, right);
        }
        Command::Manipulator { arm, claw } => {
            channel.send(&Instruction::SetManipulator {
                arm: *arm,
                claw: *claw,
            })?;
        }
        Command::Motors { left, right } => {
            let full_scale = MOTOR_COMMAND_FULL_SCALE.unsigned_abs();
            if left.unsigned_abs() > full_scale || right.unsigned_abs() > full_scale {
                warn!("Motor commands are clamped to ±{}", full_scale);
            }
            channel.send(&Instruction::SetMotors {
                left: *left,
                right: *right,
            })?;
        }
        Command::Monitor { distances_every_ms } => {
            monitor(&mut channel, distances_every_ms.map(Duration::from_millis))?
        }
    }
    Ok(())
}

fn monitor(
    channel: &mut BridgeChannel<HostStream>,
    distances_every: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    let mut next_request = Instant::now();
    while running.load(Ordering::SeqCst) {
        if let Some(period) = distances_every {
            if Instant::now() >= next_request {
                channel.send(&Instruction::GetDistances)?;
                next_request += period;
            }
        }

        match channel.poll::<Telemetry>() {
            Some(Ok(telemetry)) => print_telemetry(&telemetry),
            Some(Err(e)) => warn!("Telemetry dropped: {}", e),
            None => {
                if let Err(e) = channel.stream().check() {
                    info!("Robot closed the connection: {}", e);
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }

    let stats = channel.stats();
    info!("{} received, {} dropped", stats.received, stats.dropped);
    Ok(())
}

fn print_telemetry(telemetry: &Telemetry) {
    match telemetry {
        Telemetry::Millis(ms) => println!("[millis] {ms}"),
        Telemetry::Log(line) => println!("[robot] {}", String::from_utf8_lossy(line)),
        Telemetry::Distances { left, right } => println!("[distances] {left} {right}"),
    }
}
