use serde::{Deserialize, Serialize};

use super::cell::{CellValue, ExtraColumns};

/// Target row name for monthly revenue.
pub const MONTHLY_REVENUE_TARGET: &str = "Monthly_Revenue";
pub const MINIMUM_RUNWAY_TARGET: &str = "Minimum_Runway";
pub const MAXIMUM_BURN_MULTIPLE_TARGET: &str = "Maximum_Burn_Multiple";
pub const MINIMUM_CASH_BALANCE_TARGET: &str = "Minimum_Cash_Balance";

/// A KPI target with warning and critical thresholds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub metric: String,
    pub target: CellValue,
    pub warning_threshold: CellValue,
    pub critical_threshold: CellValue,
    pub notes: String,
    pub extra: ExtraColumns,
}

impl Target {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ..Default::default()
        }
    }
}
