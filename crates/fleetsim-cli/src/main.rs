//! fleetsim CLI
//!
//! Runs GPU fleet placement and QoS-driven rebalancing simulations.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fleetsim_core::{FleetsimConfig, StrategyKind};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// fleetsim - GPU fleet placement and rebalancing simulator
#[derive(Parser, Debug)]
#[command(name = "fleetsim")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Place the workloads and run the monitoring loops
    Run {
        /// Scenario file (TOML); the built-in scenario is used otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Placement strategy (priority, bin-packing, round-robin, proportional-fairness)
        #[arg(long)]
        strategy: Option<StrategyKind>,

        /// Simulation length in seconds
        #[arg(long)]
        duration_secs: Option<u64>,

        /// Append logs to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Perturb workload requests while running
        #[arg(long)]
        drift: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where each workload would be placed, without running
    Check {
        /// Scenario file (TOML); the built-in scenario is used otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Placement strategy
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },

    /// Write the built-in scenario as TOML
    Init {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            strategy,
            duration_secs,
            log_file,
            drift,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(strategy) = strategy {
                config.simulation.strategy = strategy;
            }
            if let Some(duration_secs) = duration_secs {
                config.simulation.duration_secs = duration_secs;
            }
            if log_file.is_some() {
                config.logging.file = log_file;
            }
            if drift {
                config.drift.enabled = true;
            }

            init_logging(cli.log_level.as_deref(), &config)?;
            commands::run(config, json).await?;
        }
        Commands::Check { config, strategy } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(strategy) = strategy {
                config.simulation.strategy = strategy;
            }

            init_logging(cli.log_level.as_deref(), &config)?;
            commands::check(config).await?;
        }
        Commands::Init { output, force } => {
            commands::init(output.as_deref(), force)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FleetsimConfig> {
    match path {
        Some(path) => FleetsimConfig::from_file(path)
            .with_context(|| format!("Failed to load scenario {}", path.display())),
        None => Ok(FleetsimConfig::default()),
    }
}

fn init_logging(level: Option<&str>, config: &FleetsimConfig) -> anyhow::Result<()> {
    let level = level.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(())
}
