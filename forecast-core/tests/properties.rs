//! Laws that hold for every input.

use proptest::prelude::*;
use rust_decimal::Decimal;

use forecast_core::{
    Driver, EngineConfig, MONTH_COUNT, MetricName, TOTAL_EXPENSES, TOTAL_REVENUE, find_metric,
    recalculate,
};

const KEYS: &[(&str, &str)] = &[
    ("BVI Program", "Program_Timing"),
    ("BVI Program", "Seats_Forecast"),
    ("BVI Program", "Tuition_Per_Seat"),
    ("BVI Program", "Sponsor_Count"),
    ("BVI Program", "Sponsor_Amount"),
    ("BVI Program", "COGS_Percentage"),
    ("SOBVR", "Lead_Sponsor_Fee"),
    ("SOBVR", "Lead_Sponsor_Probability"),
    ("SOBVR", "Secondary_Sponsors"),
    ("SOBVR", "Secondary_Sponsor_Fee"),
    ("SOBVR", "Secondary_Sponsor_Probability"),
];

fn month_values() -> impl Strategy<Value = [i64; MONTH_COUNT]> {
    prop::array::uniform9(-1_000i64..100_000)
}

/// Any subset of the known drivers with bounded values.
fn drivers() -> impl Strategy<Value = Vec<Driver>> {
    let row = (any::<prop::sample::Index>(), month_values());
    prop::collection::vec(row, 0..KEYS.len() * 2).prop_map(|rows| {
        rows.into_iter()
            .map(|(index, values)| {
                let (category, name) = KEYS[index.index(KEYS.len())];
                Driver::new(category, name).with_values(values)
            })
            .collect()
    })
}

fn config() -> impl Strategy<Value = EngineConfig> {
    (-1_000_000i64..1_000_000, 1usize..=MONTH_COUNT).prop_map(|(opening, window)| EngineConfig {
        opening_cash_balance: Decimal::from(opening),
        burn_window_months: window,
        ..EngineConfig::default()
    })
}

proptest! {
    #[test]
    fn recalculation_is_idempotent(drivers in drivers(), config in config()) {
        let first = recalculate(&drivers, &[], &[], &config);
        let second = recalculate(&drivers, &[], &[], &config);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn totals_sum_their_lines(drivers in drivers()) {
        let tables = recalculate(&drivers, &[], &[], &EngineConfig::default());

        let (revenue_lines, revenue_total) =
            tables.revenue_model.split_at(tables.revenue_model.len() - 1);
        let (cost_lines, cost_total) = tables.cost_model.split_at(tables.cost_model.len() - 1);
        prop_assert_eq!(&revenue_total[0].stream, TOTAL_REVENUE);
        prop_assert_eq!(&cost_total[0].category, TOTAL_EXPENSES);

        for month in 0..MONTH_COUNT {
            let revenue: Decimal = revenue_lines.iter().map(|l| l.values[month]).sum();
            let cost: Decimal = cost_lines.iter().map(|l| l.values[month]).sum();
            prop_assert_eq!(revenue_total[0].values[month], revenue);
            prop_assert_eq!(cost_total[0].values[month], cost);
        }
    }

    #[test]
    fn net_income_and_cash_are_consistent(drivers in drivers(), config in config()) {
        let tables = recalculate(&drivers, &[], &[], &config);
        let row = |name| find_metric(&tables.forecast, name).map(|r| r.values);

        let revenue = row(MetricName::Revenue).unwrap();
        let expenses = row(MetricName::Expenses).unwrap();
        let net = row(MetricName::NetIncome).unwrap();
        let cash = row(MetricName::EndingCashBalance).unwrap();

        prop_assert_eq!(cash[0], config.opening_cash_balance + net[0]);
        for month in 0..MONTH_COUNT {
            prop_assert_eq!(net[month], revenue[month] - expenses[month]);
            if month > 0 {
                prop_assert_eq!(cash[month], cash[month - 1] + net[month]);
            }
        }
    }

    #[test]
    fn forecast_shape_is_fixed(drivers in drivers()) {
        let tables = recalculate(&drivers, &[], &[], &EngineConfig::default());

        let names: Vec<&str> = tables.forecast.iter().map(|r| r.metric.as_str()).collect();
        let expected: Vec<&str> = MetricName::ALL.iter().map(|m| m.as_str()).collect();
        prop_assert_eq!(names, expected);
        prop_assert_eq!(tables.revenue_model.len(), 5);
        prop_assert_eq!(tables.cost_model.len(), 2);
    }
}
