use std::fmt::Write as _;

use anyhow::{Context, Result};
use tracing::{info, warn};

use forecast_core::calculations::{MetricGrade, displayed_revenue_gap};
use forecast_core::db::{MemoryStoreFactory, StoreRegistry};
use forecast_core::{
    EngineConfig, ForecastEngine, ForecastMetric, MONTHS, MetricName, Scenario, SnapshotStore,
};
use forecast_data::{
    DirectoryStoreFactory, LoadReport, LoadStatus, SaveReport, load_snapshot, save_snapshot,
};
use forecast_db_sqlite::SqliteStoreFactory;

const METRIC_WIDTH: usize = 20;
const CELL_WIDTH: usize = 12;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Recalc { save: bool },
    ApplyScenario { scenario: Scenario, save: bool },
    Status,
}

/// Registry with every backend this binary knows about.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(DirectoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry.register(Box::new(MemoryStoreFactory));
    registry
}

/// Accepts `Optimistic`, `Base_Case`, `Base Case` or `Conservative`, in any
/// case.
pub fn parse_scenario(input: &str) -> Result<Scenario, String> {
    let input = input.trim();
    Scenario::ALL
        .into_iter()
        .find(|s| {
            s.as_str().eq_ignore_ascii_case(input) || s.label().eq_ignore_ascii_case(input)
        })
        .ok_or_else(|| {
            format!("unknown scenario '{input}'; expected Optimistic, Base_Case or Conservative")
        })
}

/// Loads a snapshot and recalculates it. Datasets that fail to load stay
/// empty; the report says which.
pub async fn open_engine(
    store: &dyn SnapshotStore,
    config: EngineConfig,
) -> Result<(ForecastEngine, LoadReport)> {
    let (snapshot, report) = load_snapshot(store).await;
    let mut engine =
        ForecastEngine::from_snapshot(config, snapshot).context("invalid engine configuration")?;
    engine.recalculate();
    Ok((engine, report))
}

/// Runs `command` against `store` and returns the text to print.
pub async fn run(
    command: &Command,
    store: &dyn SnapshotStore,
    config: EngineConfig,
) -> Result<String> {
    let (mut engine, report) = open_engine(store, config).await?;
    let loaded = report
        .datasets
        .iter()
        .filter(|(_, status)| matches!(status, LoadStatus::Loaded { .. }))
        .count();
    info!(
        backend = store.backend_name(),
        loaded,
        complete = report.is_complete(),
        "snapshot opened"
    );

    let mut output = String::new();
    match command {
        Command::Recalc { save } => {
            output.push_str(&render_forecast(&engine.derived().forecast));
            if *save {
                let saved = save_snapshot(store, &engine).await;
                output.push_str(&render_save_report(&saved));
            }
        }
        Command::ApplyScenario { scenario, save } => {
            engine
                .apply_scenario(*scenario)
                .with_context(|| format!("cannot apply scenario {}", scenario.label()))?;
            writeln!(output, "Scenario: {}", scenario.label())?;
            output.push_str(&render_forecast(&engine.derived().forecast));
            if *save {
                let saved = save_snapshot(store, &engine).await;
                output.push_str(&render_save_report(&saved));
            }
        }
        Command::Status => {
            let scenario = engine.active_scenario().unwrap_or_default();
            writeln!(output, "Scenario: {}", scenario.label())?;
            output.push_str(&render_grades(&engine.grades()));
        }
    }
    Ok(output)
}

fn header() -> String {
    let mut line = format!("{:<METRIC_WIDTH$}", "Metric");
    for month in MONTHS {
        line.push_str(&format!("{month:>CELL_WIDTH$}"));
    }
    line.push('\n');
    line
}

/// Forecast rows as a fixed-width table. The revenue gap shows its
/// displayed (non-negative) value.
pub fn render_forecast(forecast: &[ForecastMetric]) -> String {
    let mut table = header();
    for row in forecast {
        table.push_str(&format!("{:<METRIC_WIDTH$}", row.metric));
        let is_gap = row.is(MetricName::RevenueGap);
        for value in row.values {
            let shown = if is_gap {
                displayed_revenue_gap(value)
            } else {
                value
            };
            table.push_str(&format!("{:>CELL_WIDTH$}", shown.round_dp(2).normalize()));
        }
        table.push('\n');
    }
    table
}

/// One line per graded metric with each month's status.
pub fn render_grades(grades: &[MetricGrade]) -> String {
    let mut table = header();
    let mut current: Option<MetricName> = None;

    for grade in grades {
        if current != Some(grade.metric) {
            if current.is_some() {
                table.push('\n');
            }
            table.push_str(&format!("{:<METRIC_WIDTH$}", grade.metric.as_str()));
            current = Some(grade.metric);
        }
        table.push_str(&format!("{:>CELL_WIDTH$}", grade.status.as_str()));
    }
    if current.is_some() {
        table.push('\n');
    }
    table
}

fn render_save_report(report: &SaveReport) -> String {
    let mut text = format!("Saved {} of {} datasets\n", report.saved(), report.datasets.len());
    for (dataset, err) in report.failures() {
        warn!(dataset = dataset.file_name(), error = %err, "dataset not saved");
        text.push_str(&format!("  {}: {err}\n", dataset.file_name()));
    }
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use forecast_core::Dataset;
    use forecast_core::calculations::common::coerce;
    use forecast_core::db::MemoryStore;

    use super::*;

    const DRIVERS: &str = include_str!("../../forecast-data/tests/fixtures/bvi/drivers.csv");
    const SCENARIOS: &str = include_str!("../../forecast-data/tests/fixtures/bvi/case-switch.csv");
    const TARGETS: &str = include_str!("../../forecast-data/tests/fixtures/bvi/targets.csv");

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.save(Dataset::Drivers, DRIVERS, "seed").await.unwrap();
        store.save(Dataset::Scenarios, SCENARIOS, "seed").await.unwrap();
        store.save(Dataset::Targets, TARGETS, "seed").await.unwrap();
        store
    }

    fn line<'a>(
        output: &'a str,
        metric: &str,
    ) -> &'a str {
        output
            .lines()
            .find(|l| l.split_whitespace().next() == Some(metric))
            .unwrap_or_else(|| panic!("no {metric} line in:\n{output}"))
    }

    fn cells<'a>(
        output: &'a str,
        metric: &str,
    ) -> Vec<&'a str> {
        line(output, metric).split_whitespace().skip(1).collect()
    }

    // =========================================================================
    // Argument parsing tests
    // =========================================================================

    #[test]
    fn parse_scenario_accepts_names_and_labels() {
        assert_eq!(parse_scenario("Optimistic"), Ok(Scenario::Optimistic));
        assert_eq!(parse_scenario("base case"), Ok(Scenario::BaseCase));
        assert_eq!(parse_scenario("BASE_CASE"), Ok(Scenario::BaseCase));
        assert_eq!(parse_scenario(" conservative "), Ok(Scenario::Conservative));
        assert!(parse_scenario("Pessimistic").is_err());
    }

    #[test]
    fn registry_offers_every_backend() {
        let registry = build_registry();

        assert_eq!(registry.available_backends(), vec!["dir", "memory", "sqlite"]);
    }

    // =========================================================================
    // Command tests
    // =========================================================================

    #[tokio::test]
    async fn recalc_prints_forecast_without_saving() {
        let store = seeded_store().await;

        let output = run(&Command::Recalc { save: false }, &store, EngineConfig::default())
            .await
            .unwrap();

        assert_eq!(
            cells(&output, "Revenue"),
            vec!["0", "0", "0", "0", "0", "90000", "0", "0", "25000"]
        );
        assert_eq!(cells(&output, "Expenses")[5], "48000");
        assert_eq!(cells(&output, "Ending_Cash_Balance")[8], "67000");
        assert_eq!(cells(&output, "Runway_Months")[0], "999");
        assert_eq!(store.last_message(Dataset::Forecast), None);
    }

    #[tokio::test]
    async fn recalc_uses_opening_cash_from_config() {
        let store = seeded_store().await;
        let config = EngineConfig {
            opening_cash_balance: dec!(100000),
            ..Default::default()
        };

        let output = run(&Command::Recalc { save: false }, &store, config).await.unwrap();

        assert_eq!(cells(&output, "Ending_Cash_Balance")[0], "100000");
        assert_eq!(cells(&output, "Ending_Cash_Balance")[8], "167000");
    }

    #[tokio::test]
    async fn recalc_with_save_writes_every_dataset() {
        let store = seeded_store().await;

        let output = run(&Command::Recalc { save: true }, &store, EngineConfig::default())
            .await
            .unwrap();

        assert!(output.ends_with("Saved 6 of 6 datasets\n"));
        for dataset in Dataset::ALL {
            assert_eq!(
                store.last_message(dataset).as_deref(),
                Some(dataset.save_message())
            );
        }
    }

    #[tokio::test]
    async fn apply_scenario_switches_toggle_and_parameters() {
        let store = seeded_store().await;
        let command = Command::ApplyScenario {
            scenario: Scenario::Optimistic,
            save: true,
        };

        let output = run(&command, &store, EngineConfig::default()).await.unwrap();
        let (engine, _) = open_engine(&store, EngineConfig::default()).await.unwrap();

        assert!(output.starts_with("Scenario: Optimistic\n"));
        assert_eq!(engine.active_scenario(), Some(Scenario::Optimistic));
        assert_eq!(coerce(&engine.scenarios()[0].current), dec!(14));
    }

    #[tokio::test]
    async fn apply_scenario_without_toggle_fails() {
        let store = MemoryStore::new();
        let command = Command::ApplyScenario {
            scenario: Scenario::Conservative,
            save: true,
        };

        let result = run(&command, &store, EngineConfig::default()).await;

        assert!(result.is_err());
        assert_eq!(store.last_message(Dataset::Drivers), None);
    }

    #[tokio::test]
    async fn status_grades_against_targets() {
        let store = seeded_store().await;

        let output = run(&Command::Status, &store, EngineConfig::default())
            .await
            .unwrap();

        assert!(output.starts_with("Scenario: Base Case\n"));
        assert_eq!(cells(&output, "Ending_Cash_Balance")[0], "failing");
        assert!(
            line(&output, "Runway_Months")
                .split_whitespace()
                .skip(1)
                .all(|w| w == "on" || w == "target")
        );
    }

    // =========================================================================
    // Rendering tests
    // =========================================================================

    #[test]
    fn render_forecast_floors_displayed_revenue_gap() {
        let row = ForecastMetric {
            metric: "Revenue_Gap".to_string(),
            values: [
                dec!(-500),
                dec!(1250.5),
                dec!(0),
                dec!(0),
                dec!(0),
                dec!(0),
                dec!(0),
                dec!(0),
                dec!(0),
            ],
            ..Default::default()
        };

        let table = render_forecast(&[row]);

        assert_eq!(cells(&table, "Revenue_Gap")[..2], ["0", "1250.5"]);
    }

    #[test]
    fn render_grades_with_no_grades_is_header_only() {
        let table = render_grades(&[]);

        assert_eq!(table.lines().count(), 1);
        assert!(table.starts_with("Metric"));
    }
}
