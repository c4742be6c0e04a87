//! # barsched CLI
//!
//! Runs the status-line scheduler and writes the i3bar protocol to stdout.
//!
//! Usage:
//!   barsched                           # Default config path
//!   barsched --config blocks.json      # Explicit config
//!   barsched -v                        # Debug logging on stderr

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;

use barsched::builders::build_bar;
use barsched::config::{default_config_path, BarConfig};
use barsched::core::{signal_name, AppResult, Scheduler};
use barsched::util::init_tracing;

#[derive(Parser)]
#[command(
    name = "barsched",
    version,
    about = "Signal-driven scheduler for status-line blocks"
)]
struct Cli {
    /// Config file path, defaults to $XDG_CONFIG_HOME/barsched/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli
        .config
        .or_else(default_config_path)
        .ok_or_else(|| anyhow!("no config path given and neither XDG_CONFIG_HOME nor HOME is set"))?;
    let cfg = BarConfig::from_path(&path)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("loading {}", path.display()))?;
    info!(config = %path.display(), blocks = cfg.blocks.len(), "starting");

    let mut bar = build_bar(&cfg)?;
    let mut scheduler = Scheduler::init(&bar, &cfg.scheduler).context("scheduler startup failed")?;
    let signo = scheduler.start(&mut bar)?;
    info!(signal = %signal_name(signo), "stopped");
    Ok(())
}
