//! Revenue model calculation.
//!
//! Evaluates every revenue line item against the drivers and appends a
//! `Total_Revenue` row summing all lines.

use tracing::debug;

use crate::calculations::common::sum_months;
use crate::calculations::line_items::{DEFAULT_REVENUE_CATALOG, LineInputs, LineItem};
use crate::models::{Driver, RevenueLine, ScenarioParameter, TOTAL_REVENUE};

const TOTAL_FORMULA: &str = "=SUM(C3:C22)";
const TOTAL_NOTES: &str = "All revenue for the month";

/// Calculates revenue lines from a catalog of line items.
///
/// # Examples
///
/// ```
/// use forecast_core::calculations::revenue_model::RevenueModelCalculator;
///
/// let lines = RevenueModelCalculator::new().calculate(&[], &[]);
///
/// assert_eq!(lines.last().map(|l| l.stream.as_str()), Some("Total_Revenue"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RevenueModelCalculator<'a> {
    catalog: &'a [LineItem],
}

impl Default for RevenueModelCalculator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RevenueModelCalculator<'static> {
    /// Uses the built-in revenue catalog.
    pub fn new() -> Self {
        Self {
            catalog: DEFAULT_REVENUE_CATALOG,
        }
    }
}

impl<'a> RevenueModelCalculator<'a> {
    pub fn with_catalog(catalog: &'a [LineItem]) -> Self {
        Self { catalog }
    }

    /// Computes one row per catalog entry, in order, followed by the total.
    pub fn calculate(
        &self,
        drivers: &[Driver],
        scenarios: &[ScenarioParameter],
    ) -> Vec<RevenueLine> {
        let inputs = LineInputs::new(drivers, scenarios);

        let mut lines: Vec<RevenueLine> = self
            .catalog
            .iter()
            .map(|item| RevenueLine {
                stream: item.name.to_string(),
                formula: item.formula_text.to_string(),
                values: item.evaluate(&inputs),
                notes: item.notes.to_string(),
                ..Default::default()
            })
            .collect();

        let total = sum_months(lines.iter().map(|l| &l.values));
        lines.push(RevenueLine {
            stream: TOTAL_REVENUE.to_string(),
            formula: TOTAL_FORMULA.to_string(),
            values: total,
            notes: TOTAL_NOTES.to_string(),
            ..Default::default()
        });

        debug!(lines = lines.len(), "revenue model calculated");
        lines
    }
}

/// Computes the revenue model with the built-in catalog.
pub fn calculate_revenue_model(
    drivers: &[Driver],
    scenarios: &[ScenarioParameter],
) -> Vec<RevenueLine> {
    RevenueModelCalculator::new().calculate(drivers, scenarios)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::line_items::{InputKey, gated_product};
    use crate::models::{MONTH_COUNT, MonthlyValues};

    const SEPTEMBER: usize = 5;

    fn line<'a>(
        lines: &'a [RevenueLine],
        stream: &str,
    ) -> &'a MonthlyValues<Decimal> {
        &lines
            .iter()
            .find(|l| l.stream == stream)
            .unwrap_or_else(|| panic!("missing line {stream}"))
            .values
    }

    fn drivers() -> Vec<Driver> {
        let mut timing = [0; MONTH_COUNT];
        timing[SEPTEMBER] = 1;
        let mut seats = [0; MONTH_COUNT];
        seats[SEPTEMBER] = 10;
        let mut tuition = [0; MONTH_COUNT];
        tuition[SEPTEMBER] = 8000;

        vec![
            Driver::new("BVI Program", "Program_Timing").with_values(timing),
            Driver::new("BVI Program", "Seats_Forecast").with_values(seats),
            Driver::new("BVI Program", "Tuition_Per_Seat").with_values(tuition),
            Driver::new("BVI Program", "Sponsor_Count").with_values([2; MONTH_COUNT]),
            Driver::new("BVI Program", "Sponsor_Amount").with_values([5000; MONTH_COUNT]),
            Driver::new("SOBVR", "Lead_Sponsor_Fee").with_values([50000; MONTH_COUNT]),
            Driver::new("SOBVR", "Lead_Sponsor_Probability").with_values([50; MONTH_COUNT]),
        ]
    }

    // =========================================================================
    // Default catalog tests
    // =========================================================================

    #[test]
    fn bvi_revenue_only_in_program_month() {
        let lines = calculate_revenue_model(&drivers(), &[]);

        let bvi = line(&lines, "BVI_Revenue");

        assert_eq!(bvi[SEPTEMBER], dec!(80000));
        for (month, value) in bvi.iter().enumerate() {
            if month != SEPTEMBER {
                assert_eq!(*value, dec!(0), "month {month}");
            }
        }
    }

    #[test]
    fn sponsorship_is_gated_by_timing() {
        let lines = calculate_revenue_model(&drivers(), &[]);

        let sponsorship = line(&lines, "BVI_Sponsorship");

        assert_eq!(sponsorship[SEPTEMBER], dec!(10000));
        assert_eq!(sponsorship[0], dec!(0));
    }

    #[test]
    fn lead_sponsor_is_probability_weighted_every_month() {
        let lines = calculate_revenue_model(&drivers(), &[]);

        assert_eq!(line(&lines, "SOBVR_Lead"), &[dec!(25000); MONTH_COUNT]);
    }

    #[test]
    fn line_with_missing_driver_is_zero() {
        let lines = calculate_revenue_model(&drivers(), &[]);

        assert_eq!(line(&lines, "SOBVR_Secondary"), &[dec!(0); MONTH_COUNT]);
    }

    #[test]
    fn total_is_last_and_sums_all_lines() {
        let lines = calculate_revenue_model(&drivers(), &[]);

        let total = lines.last().expect("total row");
        assert_eq!(total.stream, TOTAL_REVENUE);
        assert_eq!(total.values[0], dec!(25000));
        assert_eq!(total.values[SEPTEMBER], dec!(115000));
        assert_eq!(lines.iter().filter(|l| l.is_total()).count(), 1);
    }

    #[test]
    fn empty_drivers_yield_full_zero_table() {
        let lines = calculate_revenue_model(&[], &[]);

        let streams: Vec<&str> = lines.iter().map(|l| l.stream.as_str()).collect();
        assert_eq!(
            streams,
            vec![
                "BVI_Revenue",
                "BVI_Sponsorship",
                "SOBVR_Lead",
                "SOBVR_Secondary",
                "Total_Revenue"
            ]
        );
        assert!(lines.iter().all(|l| l.values == [dec!(0); MONTH_COUNT]));
    }

    #[test]
    fn lines_carry_formula_text_and_notes() {
        let lines = calculate_revenue_model(&[], &[]);

        assert_eq!(lines[2].formula, "=Drivers!C27*Drivers!C28/100");
        assert_eq!(lines[2].notes, "Primary report sponsor");
    }

    // =========================================================================
    // Custom catalog tests
    // =========================================================================

    #[test]
    fn custom_catalog_replaces_default_lines() {
        static CATALOG: &[LineItem] = &[LineItem {
            name: "Gala",
            formula_text: "=Drivers!C40*Drivers!C41",
            notes: "Annual gala",
            inputs: &[
                InputKey::driver("Gala", "Held"),
                InputKey::driver("Gala", "Tickets"),
                InputKey::driver("Gala", "Price"),
            ],
            compute: gated_product,
        }];
        let drivers = vec![
            Driver::new("Gala", "Held").with_values([1; MONTH_COUNT]),
            Driver::new("Gala", "Tickets").with_values([100; MONTH_COUNT]),
            Driver::new("Gala", "Price").with_values(["75"; MONTH_COUNT]),
        ];

        let lines = RevenueModelCalculator::with_catalog(CATALOG).calculate(&drivers, &[]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].stream, "Gala");
        assert_eq!(lines[1].values, [dec!(7500); MONTH_COUNT]);
    }
}
