//! Cost model calculation.
//!
//! Cost lines come from the expense catalog. Variable lines re-derive the
//! revenue they scale from the drivers with the same formula the revenue
//! model uses, so the two tables cannot disagree.

use tracing::debug;

use crate::calculations::common::sum_months;
use crate::calculations::line_items::{DEFAULT_COST_CATALOG, ExpenseItem, LineInputs};
use crate::models::{Driver, ExpenseLine, ScenarioParameter, TOTAL_EXPENSES};

const TOTAL_FORMULA: &str = "=SUM(C3:C18)";
const TOTAL_NOTES: &str = "All expenses for the month";

#[derive(Debug, Clone, Copy)]
pub struct CostModelCalculator<'a> {
    catalog: &'a [ExpenseItem],
}

impl Default for CostModelCalculator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModelCalculator<'static> {
    pub fn new() -> Self {
        Self {
            catalog: DEFAULT_COST_CATALOG,
        }
    }
}

impl<'a> CostModelCalculator<'a> {
    pub fn with_catalog(catalog: &'a [ExpenseItem]) -> Self {
        Self { catalog }
    }

    /// Computes one row per catalog entry followed by `Total_Expenses`.
    ///
    /// The total row has no expense type.
    pub fn calculate(
        &self,
        drivers: &[Driver],
        scenarios: &[ScenarioParameter],
    ) -> Vec<ExpenseLine> {
        let inputs = LineInputs::new(drivers, scenarios);

        let mut lines: Vec<ExpenseLine> = self
            .catalog
            .iter()
            .map(|item| ExpenseLine {
                category: item.line.name.to_string(),
                expense_type: Some(item.expense_type),
                formula: item.line.formula_text.to_string(),
                values: item.line.evaluate(&inputs),
                notes: item.line.notes.to_string(),
                ..Default::default()
            })
            .collect();

        let total = sum_months(lines.iter().map(|l| &l.values));
        lines.push(ExpenseLine {
            category: TOTAL_EXPENSES.to_string(),
            expense_type: None,
            formula: TOTAL_FORMULA.to_string(),
            values: total,
            notes: TOTAL_NOTES.to_string(),
            ..Default::default()
        });

        debug!(lines = lines.len(), "cost model calculated");
        lines
    }
}

/// Computes the cost model with the built-in catalog.
pub fn calculate_cost_model(
    drivers: &[Driver],
    scenarios: &[ScenarioParameter],
) -> Vec<ExpenseLine> {
    CostModelCalculator::new().calculate(drivers, scenarios)
}
