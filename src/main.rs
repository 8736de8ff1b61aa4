//! sg90ctl: console front end for the SG90 servo driver.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  stdin/stdout ──▶ rpc::session (console | serve)         │
//! │                           │                              │
//! │  ────────────── Port Trait Boundary ──────────────       │
//! │                           ▼                              │
//! │                   ServoController                        │
//! │                     │           │                        │
//! │        SysfsPwm | SimPwm   LockFileRegistry | SimRegistry│
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use sg90::adapters::config_file::JsonConfigFile;
use sg90::adapters::node::{LockFileRegistry, DEFAULT_LOCK_DIR};
use sg90::adapters::sim::{SimPwm, SimRegistry};
use sg90::adapters::sysfs::{SysfsPwm, DEFAULT_SYSFS_ROOT};
use sg90::app::ports::{ConfigPort, NodeRegistry, PwmProvider};
use sg90::rpc::session;
use sg90::{ServoConfig, ServoController};

#[derive(Parser)]
#[command(name = "sg90ctl")]
#[command(version)]
#[command(about = "Drive an SG90 servo through a PWM channel", long_about = None)]
struct Cli {
    /// Use in-memory PWM and node backends instead of the hardware
    #[arg(long)]
    sim: bool,

    /// JSON file overriding the default servo configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// sysfs PWM class directory
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SYSFS_ROOT)]
    pwm_root: PathBuf,

    /// PWM line within the selected chip
    #[arg(long, value_name = "N", default_value_t = 0)]
    pwm_line: u32,

    /// Directory holding node and line lock files
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOCK_DIR)]
    lock_dir: PathBuf,

    /// Log filter, e.g. `info` or `sg90=debug`
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Mode {
    /// Interactive angle prompt (default)
    #[default]
    Console,
    /// Length-prefixed binary requests on stdin, responses on stdout
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the console or the frame stream.
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    info!("sg90ctl v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServoConfig::default(),
    };
    let mode = cli.mode.unwrap_or_default();

    if cli.sim {
        // First candidate by name, plus a spare for the index fallback.
        let provider = SimPwm::new(config.candidates().take(1).chain(["sim0"]));
        run(config, provider, SimRegistry::new(), mode)
    } else {
        let provider = SysfsPwm::new(&cli.pwm_root, &cli.lock_dir).with_line(cli.pwm_line);
        run(config, provider, LockFileRegistry::new(&cli.lock_dir), mode)
    }
}

fn run<P, R>(config: ServoConfig, provider: P, registry: R, mode: Mode) -> Result<()>
where
    P: PwmProvider,
    R: NodeRegistry,
{
    let mut servo =
        ServoController::new(config, provider, registry).context("invalid servo configuration")?;
    servo.initialize().context("servo initialization failed")?;

    let result = match mode {
        Mode::Console => session::run_console(&mut servo, io::stdin().lock(), io::stdout().lock()),
        Mode::Serve => session::serve(&mut servo, io::stdin().lock(), io::stdout().lock()).map(drop),
    };

    servo.shutdown();
    result.context("console I/O failed")
}
