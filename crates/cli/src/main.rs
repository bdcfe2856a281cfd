//! Settle distribution simulator
//!
//! Validates distribution parameters and replays block scenarios against the
//! in-memory bank and validator registry, printing JSON reports.

mod scenario;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scenario::{run_scenario, Scenario};
use settings::SimConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "setl-sim")]
#[command(about = "Settle fee distribution simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration, then print it
    CheckParams,
    /// Replay a JSON scenario and print the resulting ledger
    Simulate {
        /// Scenario file
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SimConfig::load(cli.config.as_deref())?;
    init_logging(&config)?;

    match cli.command {
        Commands::CheckParams => {
            info!(
                target: "distribution",
                policy = config.distribution.policy.as_str(),
                "Configuration is valid"
            );
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Simulate { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            info!(
                target: "distribution",
                validators = scenario.validators.len(),
                blocks = scenario.blocks.len(),
                "Starting simulation"
            );
            let report = run_scenario(&config, &scenario)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to encode report")?
            );
        }
    }

    Ok(())
}

fn init_logging(config: &SimConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "compact" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}
