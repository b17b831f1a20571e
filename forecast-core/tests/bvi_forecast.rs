//! End-to-end recalculation of the BVI program forecast.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use forecast_core::calculations::common::coerce;
use forecast_core::calculations::targets::MetricStatus;
use forecast_core::{
    CellValue, Driver, EngineConfig, ForecastEngine, MONTH_COUNT, MetricName, Scenario,
    ScenarioParameter, Target, find_metric,
};

const SEPTEMBER: usize = 5;

fn september_only(value: i64) -> [i64; MONTH_COUNT] {
    let mut values = [0; MONTH_COUNT];
    values[SEPTEMBER] = value;
    values
}

fn drivers() -> Vec<Driver> {
    vec![
        Driver::new("BVI Program", "Program_Timing").with_values(september_only(1)),
        Driver::new("BVI Program", "Seats_Forecast").with_values(september_only(10)),
        Driver::new("BVI Program", "Tuition_Per_Seat").with_values(september_only(8000)),
        Driver::new("BVI Program", "Sponsor_Count").with_values(september_only(2)),
        Driver::new("BVI Program", "Sponsor_Amount").with_values(september_only(5000)),
        Driver::new("BVI Program", "COGS_Percentage").with_values([60; MONTH_COUNT]),
        Driver::new("SOBVR", "Lead_Sponsor_Fee").with_values(["50000"; MONTH_COUNT]),
        Driver::new("SOBVR", "Lead_Sponsor_Probability").with_values(["1,200"; MONTH_COUNT]),
        Driver::new("Scenario", "Toggle").with_values([2; MONTH_COUNT]),
    ]
}

fn targets() -> Vec<Target> {
    vec![
        Target {
            target: CellValue::from(12),
            warning_threshold: CellValue::from(9),
            critical_threshold: CellValue::from(6),
            ..Target::new("Minimum_Runway")
        },
        Target {
            target: CellValue::from(100000),
            ..Target::new("Monthly_Revenue")
        },
    ]
}

fn engine() -> ForecastEngine {
    let config = EngineConfig {
        opening_cash_balance: dec!(100000),
        ..EngineConfig::default()
    };
    ForecastEngine::from_inputs(config, drivers(), Vec::new(), targets()).expect("valid config")
}

fn metric(
    engine: &ForecastEngine,
    name: MetricName,
) -> [Decimal; MONTH_COUNT] {
    find_metric(&engine.derived().forecast, name)
        .map(|row| row.values)
        .expect("metric row")
}

#[test]
fn bvi_revenue_lands_in_september_only() {
    let engine = engine();

    let derived = engine.derived();
    let bvi = &derived.revenue_model[0];

    assert_eq!(bvi.stream, "BVI_Revenue");
    let mut expected = [dec!(0); MONTH_COUNT];
    expected[SEPTEMBER] = dec!(80000);
    assert_eq!(bvi.values, expected);
}

#[test]
fn thousands_separator_probability_zeroes_lead_sponsor() {
    let engine = engine();

    let derived = engine.derived();

    assert_eq!(derived.revenue_model[2].stream, "SOBVR_Lead");
    assert_eq!(derived.revenue_model[2].values, [dec!(0); MONTH_COUNT]);
}

#[test]
fn forecast_flows_from_model_totals() {
    let engine = engine();

    let revenue = metric(&engine, MetricName::Revenue);
    let expenses = metric(&engine, MetricName::Expenses);
    let net = metric(&engine, MetricName::NetIncome);
    let cash = metric(&engine, MetricName::EndingCashBalance);

    assert_eq!(revenue[SEPTEMBER], dec!(90000));
    assert_eq!(expenses[SEPTEMBER], dec!(48000));
    assert_eq!(net[SEPTEMBER], dec!(42000));
    assert_eq!(cash[0], dec!(100000));
    assert_eq!(cash[8], dec!(142000));
}

#[test]
fn runway_is_unbounded_without_burn() {
    let engine = engine();

    let runway = metric(&engine, MetricName::RunwayMonths);

    assert_eq!(runway, [dec!(999); MONTH_COUNT]);
    assert!(
        engine
            .grades()
            .iter()
            .filter(|g| g.metric == MetricName::RunwayMonths)
            .all(|g| g.status == MetricStatus::OnTarget)
    );
}

#[test]
fn scenario_switch_and_back_restores_forecast() {
    let mut engine = engine();
    engine.update_scenarios(vec![ScenarioParameter {
        base_case: CellValue::from(10),
        optimistic: CellValue::from(14),
        conservative: CellValue::from(6),
        ..ScenarioParameter::new("Seats")
    }]);
    let base = engine.derived();

    engine.apply_scenario(Scenario::Conservative).unwrap();
    assert_eq!(coerce(&engine.scenarios()[0].current), dec!(6));
    engine.apply_scenario(Scenario::BaseCase).unwrap();

    assert_eq!(*engine.derived(), *base);
    assert_eq!(coerce(&engine.scenarios()[0].current), dec!(10));
}
