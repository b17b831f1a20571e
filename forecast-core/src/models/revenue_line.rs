use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cell::ExtraColumns;
use super::month::MonthlyValues;

/// Name of the aggregate row appended to every revenue model.
pub const TOTAL_REVENUE: &str = "Total_Revenue";

/// A derived revenue stream. `formula` is display text only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueLine {
    pub stream: String,
    pub formula: String,
    pub values: MonthlyValues<Decimal>,
    pub notes: String,
    pub extra: ExtraColumns,
}

impl RevenueLine {
    pub fn is_total(&self) -> bool {
        self.stream == TOTAL_REVENUE
    }
}
