use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cell::ExtraColumns;
use super::month::MonthlyValues;

/// Name of the aggregate row appended to every cost model.
pub const TOTAL_EXPENSES: &str = "Total_Expenses";

/// Descriptive cost behaviour tag. It never affects computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    Fixed,
    Variable,
    SemiFixed,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::Variable => "Variable",
            Self::SemiFixed => "Semi-Fixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Fixed" => Some(Self::Fixed),
            "Variable" => Some(Self::Variable),
            "Semi-Fixed" => Some(Self::SemiFixed),
            _ => None,
        }
    }
}

/// A derived expense line. The aggregate row carries no type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub category: String,
    pub expense_type: Option<ExpenseType>,
    pub formula: String,
    pub values: MonthlyValues<Decimal>,
    pub notes: String,
    pub extra: ExtraColumns,
}

impl ExpenseLine {
    pub fn is_total(&self) -> bool {
        self.category == TOTAL_EXPENSES
    }
}
