//! # teledrived
//!
//! Teledriving control daemon. Polls `carState` and `testJoystick`, runs the
//! engagement state machine at a fixed rate, and publishes `carControl` and
//! `selfdriveState` once per tick.
//!
//! Configuration comes from a single TOML file (`--config`, default
//! `/etc/teledrive/teledrived.toml`). A missing file at the default path
//! falls back to built-in defaults; a missing file given explicitly is
//! fatal.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use teledrive_common::consts::DEFAULT_CONFIG_PATH;
use teledrive_control::config::{ConfigSource, TeledriveConfig, load_config};
use teledrive_control::cycle::{ControlLoop, control_topics, rt_setup};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Teledrive control daemon: joystick-to-actuation engagement loop
#[derive(Parser, Debug)]
#[command(name = "teledrived")]
#[command(version)]
#[command(about = "Fixed-rate teledriving engagement and actuation loop")]
struct Args {
    /// Path to the daemon configuration TOML.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// CPU core to pin the loop thread to (`rt` feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (`rt` feature only).
    #[arg(long, default_value_t = 50)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let explicit = args.config.is_some();
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = load_config(&path, explicit);

    let level = match &loaded {
        Ok((config, _)) => config.shared.log_level.as_directive(),
        Err(_) => "info",
    };
    setup_tracing(&args, level);

    info!("teledrived v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok((config, ConfigSource::File)) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Ok((config, ConfigSource::Defaults)) => {
            warn!("No config at {}, using built-in defaults", path.display());
            config
        }
        Err(e) => {
            error!("FATAL: config {}: {e}", path.display());
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("teledrived shutdown complete");
}

fn run(args: &Args, config: &TeledriveConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = %config.shared.service_name,
        rate_hz = config.control.rate_hz,
        joystick_timeout_ticks = config.control.joystick_timeout_ticks,
        graceful_stop_ticks = config.control.graceful_stop_ticks,
        profile = ?config.control.profile,
        "Config OK"
    );

    // Transport bridges attach to these handles; held for the process lifetime.
    let (inputs, outputs, _bridge) = control_topics(&config.control);
    let mut control = ControlLoop::new(config, inputs, outputs);

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={}, rt={})",
        args.cpu_core,
        args.rt_priority,
        cfg!(feature = "rt")
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    control.run(&running);
    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins when set; otherwise
/// `--verbose` selects DEBUG, else the configured level.
fn setup_tracing(args: &Args, config_level: &str) {
    let level = if args.verbose { "debug" } else { config_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
