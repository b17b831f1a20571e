//! Declarative line-item catalogs for the revenue and cost models.
//!
//! A line item names its inputs and a pure formula over their coerced
//! values. The calculators evaluate each item once per month; adding a
//! revenue stream means adding a catalog entry, not a new code path.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::coerce;
use crate::calculations::drivers::find_driver;
use crate::calculations::scenario::parameter_value;
use crate::models::{Driver, ExpenseType, MONTH_COUNT, MonthlyValues, ScenarioParameter};

/// Formula over a line's coerced inputs, in catalog order.
pub type LineFormula = fn(&[Decimal]) -> Decimal;

/// A value a line item depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// A driver row, read month by month.
    Driver {
        category: &'static str,
        name: &'static str,
    },
    /// A scenario parameter's current value, the same in every month.
    Parameter(&'static str),
}

impl InputKey {
    pub const fn driver(
        category: &'static str,
        name: &'static str,
    ) -> Self {
        Self::Driver { category, name }
    }
}

/// One computed row of a model.
#[derive(Debug, Clone, Copy)]
pub struct LineItem {
    pub name: &'static str,
    pub formula_text: &'static str,
    pub notes: &'static str,
    pub inputs: &'static [InputKey],
    pub compute: LineFormula,
}

/// A cost line with its classification.
#[derive(Debug, Clone, Copy)]
pub struct ExpenseItem {
    pub line: LineItem,
    pub expense_type: ExpenseType,
}

/// Tables a line item may read from.
#[derive(Debug, Clone, Copy)]
pub struct LineInputs<'a> {
    pub drivers: &'a [Driver],
    pub scenarios: &'a [ScenarioParameter],
}

enum Resolved<'a> {
    Driver(&'a Driver),
    Constant(Decimal),
}

impl Resolved<'_> {
    fn value(
        &self,
        month: usize,
    ) -> Decimal {
        match self {
            Resolved::Driver(driver) => coerce(&driver.values[month]),
            Resolved::Constant(value) => *value,
        }
    }
}

impl<'a> LineInputs<'a> {
    pub fn new(
        drivers: &'a [Driver],
        scenarios: &'a [ScenarioParameter],
    ) -> Self {
        Self { drivers, scenarios }
    }

    fn resolve(
        &self,
        key: &InputKey,
    ) -> Option<Resolved<'a>> {
        match *key {
            InputKey::Driver { category, name } => {
                find_driver(self.drivers, category, name).map(Resolved::Driver)
            }
            InputKey::Parameter(name) => {
                parameter_value(self.scenarios, name).map(Resolved::Constant)
            }
        }
    }
}

impl LineItem {
    /// Evaluates the line for every month.
    ///
    /// If any input is missing the whole row is zero.
    pub fn evaluate(
        &self,
        inputs: &LineInputs<'_>,
    ) -> MonthlyValues<Decimal> {
        let resolved: Option<Vec<Resolved<'_>>> =
            self.inputs.iter().map(|key| inputs.resolve(key)).collect();

        let Some(resolved) = resolved else {
            debug!(line = self.name, "missing input, line evaluates to zero");
            return [Decimal::ZERO; MONTH_COUNT];
        };

        std::array::from_fn(|month| {
            let args: Vec<Decimal> = resolved.iter().map(|r| r.value(month)).collect();
            (self.compute)(&args)
        })
    }
}

// ============================================================================
// Formulas
// ============================================================================

fn arg(
    args: &[Decimal],
    index: usize,
) -> Decimal {
    args.get(index).copied().unwrap_or(Decimal::ZERO)
}

fn product(values: &[Decimal]) -> Decimal {
    values
        .iter()
        .fold(Decimal::ONE, |acc, v| acc.saturating_mul(*v))
}

/// `[timing, a, b]`: `a × b` when the program runs this month, else zero.
pub fn gated_product(args: &[Decimal]) -> Decimal {
    if arg(args, 0) == Decimal::ONE {
        arg(args, 1).saturating_mul(arg(args, 2))
    } else {
        Decimal::ZERO
    }
}

/// Product of every input, with the last one read as a percentage.
pub fn probability_weighted(args: &[Decimal]) -> Decimal {
    match args.split_last() {
        Some((probability, factors)) => {
            product(factors).saturating_mul(*probability) / Decimal::ONE_HUNDRED
        }
        None => Decimal::ZERO,
    }
}

/// Tuition revenue: `[timing, seats, tuition]`.
pub fn bvi_revenue(args: &[Decimal]) -> Decimal {
    gated_product(args)
}

/// `[timing, seats, tuition, pct]`: tuition revenue × pct / 100.
pub fn bvi_cogs(args: &[Decimal]) -> Decimal {
    let revenue = bvi_revenue(&args[..args.len().min(3)]);
    revenue.saturating_mul(arg(args, 3)) / Decimal::ONE_HUNDRED
}

// ============================================================================
// Default catalogs
// ============================================================================

const BVI: &str = "BVI Program";
const SOBVR: &str = "SOBVR";

/// Revenue streams computed by default.
pub const DEFAULT_REVENUE_CATALOG: &[LineItem] = &[
    LineItem {
        name: "BVI_Revenue",
        formula_text: "=IF(Drivers!F24=1, Drivers!F19*Drivers!F20, 0)",
        notes: "Tuition revenue from BVI program",
        inputs: &[
            InputKey::driver(BVI, "Program_Timing"),
            InputKey::driver(BVI, "Seats_Forecast"),
            InputKey::driver(BVI, "Tuition_Per_Seat"),
        ],
        compute: bvi_revenue,
    },
    LineItem {
        name: "BVI_Sponsorship",
        formula_text: "=IF(Drivers!F24=1, Drivers!F21*Drivers!F22, 0)",
        notes: "Sponsorship revenue from BVI program",
        inputs: &[
            InputKey::driver(BVI, "Program_Timing"),
            InputKey::driver(BVI, "Sponsor_Count"),
            InputKey::driver(BVI, "Sponsor_Amount"),
        ],
        compute: gated_product,
    },
    LineItem {
        name: "SOBVR_Lead",
        formula_text: "=Drivers!C27*Drivers!C28/100",
        notes: "Primary report sponsor",
        inputs: &[
            InputKey::driver(SOBVR, "Lead_Sponsor_Fee"),
            InputKey::driver(SOBVR, "Lead_Sponsor_Probability"),
        ],
        compute: probability_weighted,
    },
    LineItem {
        name: "SOBVR_Secondary",
        formula_text: "=Drivers!C29*Drivers!C30*Drivers!C31/100",
        notes: "Secondary report sponsors",
        inputs: &[
            InputKey::driver(SOBVR, "Secondary_Sponsors"),
            InputKey::driver(SOBVR, "Secondary_Sponsor_Fee"),
            InputKey::driver(SOBVR, "Secondary_Sponsor_Probability"),
        ],
        compute: probability_weighted,
    },
];

/// Cost lines computed by default.
pub const DEFAULT_COST_CATALOG: &[ExpenseItem] = &[ExpenseItem {
    line: LineItem {
        name: "BVI_COGS",
        formula_text: "=Rev_Model!C3*Drivers!F25/100",
        notes: "Variable costs for BVI program (60% of revenue)",
        inputs: &[
            InputKey::driver(BVI, "Program_Timing"),
            InputKey::driver(BVI, "Seats_Forecast"),
            InputKey::driver(BVI, "Tuition_Per_Seat"),
            InputKey::driver(BVI, "COGS_Percentage"),
        ],
        compute: bvi_cogs,
    },
    expense_type: ExpenseType::Variable,
}];
