use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cell::ExtraColumns;
use super::month::MonthlyValues;

/// The fixed row set of the forecast table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricName {
    Revenue,
    Expenses,
    NetIncome,
    EndingCashBalance,
    RunwayMonths,
    BurnMultiple,
    RevenueGap,
}

impl MetricName {
    pub const ALL: [MetricName; 7] = [
        Self::Revenue,
        Self::Expenses,
        Self::NetIncome,
        Self::EndingCashBalance,
        Self::RunwayMonths,
        Self::BurnMultiple,
        Self::RevenueGap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Expenses => "Expenses",
            Self::NetIncome => "Net_Income",
            Self::EndingCashBalance => "Ending_Cash_Balance",
            Self::RunwayMonths => "Runway_Months",
            Self::BurnMultiple => "Burn_Multiple",
            Self::RevenueGap => "Revenue_Gap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

/// A row of the consolidated forecast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastMetric {
    pub metric: String,
    pub formula: String,
    pub values: MonthlyValues<Decimal>,
    pub notes: String,
    pub extra: ExtraColumns,
}

impl ForecastMetric {
    pub fn is(
        &self,
        name: MetricName,
    ) -> bool {
        self.metric == name.as_str()
    }
}

/// Finds a metric row by name; first match wins.
pub fn find_metric(
    forecast: &[ForecastMetric],
    name: MetricName,
) -> Option<&ForecastMetric> {
    forecast.iter().find(|row| row.is(name))
}
