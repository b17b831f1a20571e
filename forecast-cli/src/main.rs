use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use forecast_cli::app::{self, Command};
use forecast_cli::config::load_config;
use forecast_cli::logging;
use forecast_core::Scenario;
use forecast_core::db::StoreConfig;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Monthly revenue, cost and KPI forecast.
///
/// Loads a snapshot from the chosen store, recalculates the derived tables
/// and prints them.
#[derive(Debug, Parser)]
#[command(name = "forecast", version)]
struct Cli {
    /// Snapshot store backend: `dir`, `sqlite` or `memory`.
    #[arg(long, global = true, default_value = "dir")]
    backend: String,

    /// Backend connection string.
    /// For `dir` this is the directory holding the CSV datasets; for
    /// `sqlite` a database path or `:memory:`.
    #[arg(long, global = true, default_value = "data")]
    source: String,

    /// TOML file with an `[engine]` table.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `forecast_core=trace,info`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Recalculate and print the forecast.
    Recalc {
        /// Write every dataset back to the store.
        #[arg(long)]
        save: bool,
    },

    /// Switch scenario, recalculate and print the forecast.
    ApplyScenario {
        /// Optimistic, Base_Case or Conservative.
        #[arg(value_parser = app::parse_scenario)]
        scenario: Scenario,

        /// Write every dataset back to the store.
        #[arg(long)]
        save: bool,
    },

    /// Grade the recalculated forecast against the targets.
    Status,
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Recalc { save } => Command::Recalc { save },
            CliCommand::ApplyScenario { scenario, save } => {
                Command::ApplyScenario { scenario, save }
            }
            CliCommand::Status => Command::Status,
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging()?;
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let config = load_config(cli.config.as_deref()).context("failed to load engine config")?;
    let store_config = StoreConfig {
        backend: cli.backend,
        connection_string: cli.source,
    };

    debug!("opening {} store at '{}'", store_config.backend, store_config.connection_string);
    let registry = app::build_registry();
    let store = registry
        .create(&store_config)
        .await
        .with_context(|| format!("cannot open {} store", store_config.backend))?;

    let output = app::run(&cli.command.into(), &*store, config).await?;
    print!("{output}");

    Ok(())
}
