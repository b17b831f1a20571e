use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use forecast_data::{DirectoryStore, copy_datasets};
use forecast_db_sqlite::SqliteSnapshotStore;

/// Copy a directory of forecast CSV files into a SQLite snapshot store.
///
/// The directory may contain any of: drivers.csv, rev-model.csv,
/// cost-model.csv, forecast.csv, case-switch.csv, targets.csv. Each file
/// present becomes a new version of its dataset.
#[derive(Parser, Debug)]
#[command(name = "forecast-import")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the CSV snapshot
    #[arg(short, long)]
    source: PathBuf,

    /// SQLite database URL (e.g., sqlite:forecast.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:forecast.db?mode=rwc")]
    database: String,

    /// Run database migrations before importing
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if !args.source.is_dir() {
        bail!("Not a directory: {}", args.source.display());
    }

    let store = SqliteSnapshotStore::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        store
            .run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    println!("Importing snapshot from: {}", args.source.display());

    let source = DirectoryStore::new(&args.source);
    let report = copy_datasets(&source, &store).await;

    for (dataset, err) in report.failures() {
        eprintln!("  {}: {err}", dataset.file_name());
    }

    if report.datasets.is_empty() {
        bail!("No dataset files found in {}", args.source.display());
    }
    if !report.is_complete() {
        bail!(
            "Imported {} of {} datasets",
            report.saved(),
            report.datasets.len()
        );
    }

    println!("Successfully imported {} datasets.", report.saved());
    Ok(())
}
