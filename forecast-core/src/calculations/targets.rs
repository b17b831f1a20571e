//! Grading forecast KPIs against their targets.
//!
//! Each graded metric has a target row and a direction. The target,
//! warning and critical thresholds divide the value range into four bands.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::coerce;
use crate::models::{
    ForecastMetric, MAXIMUM_BURN_MULTIPLE_TARGET, MINIMUM_CASH_BALANCE_TARGET,
    MINIMUM_RUNWAY_TARGET, MONTHLY_REVENUE_TARGET, MetricName, Target, find_metric,
};

/// Band a metric value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricStatus {
    OnTarget,
    Warning,
    Critical,
    Failing,
}

impl MetricStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTarget => "on target",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Failing => "failing",
        }
    }
}

/// Whether larger values of a metric are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Coerced thresholds from a target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub target: Decimal,
    pub warning: Decimal,
    pub critical: Decimal,
}

impl From<&Target> for Thresholds {
    fn from(target: &Target) -> Self {
        Self {
            target: coerce(&target.target),
            warning: coerce(&target.warning_threshold),
            critical: coerce(&target.critical_threshold),
        }
    }
}

/// Metrics that are graded, with the target row and direction each uses.
pub const GRADED_METRICS: [(MetricName, &str, Direction); 4] = [
    (MetricName::RevenueGap, MONTHLY_REVENUE_TARGET, Direction::LowerIsBetter),
    (MetricName::RunwayMonths, MINIMUM_RUNWAY_TARGET, Direction::HigherIsBetter),
    (MetricName::BurnMultiple, MAXIMUM_BURN_MULTIPLE_TARGET, Direction::LowerIsBetter),
    (MetricName::EndingCashBalance, MINIMUM_CASH_BALANCE_TARGET, Direction::HigherIsBetter),
];

/// One graded cell of the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricGrade {
    pub metric: MetricName,
    pub month: usize,
    pub value: Decimal,
    pub status: MetricStatus,
}

/// Finds a target row by metric name; first match wins.
pub fn find_target<'a>(
    targets: &'a [Target],
    metric: &str,
) -> Option<&'a Target> {
    targets.iter().find(|t| t.metric == metric)
}

/// Places `value` in a band.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::targets::{Direction, MetricStatus, Thresholds, evaluate_status};
///
/// let thresholds = Thresholds { target: dec!(12), warning: dec!(9), critical: dec!(6) };
///
/// assert_eq!(evaluate_status(dec!(10), &thresholds, Direction::HigherIsBetter), MetricStatus::Warning);
/// ```
pub fn evaluate_status(
    value: Decimal,
    thresholds: &Thresholds,
    direction: Direction,
) -> MetricStatus {
    let meets = |limit: Decimal| match direction {
        Direction::HigherIsBetter => value >= limit,
        Direction::LowerIsBetter => value <= limit,
    };

    if meets(thresholds.target) {
        MetricStatus::OnTarget
    } else if meets(thresholds.warning) {
        MetricStatus::Warning
    } else if meets(thresholds.critical) {
        MetricStatus::Critical
    } else {
        MetricStatus::Failing
    }
}

/// Status of one metric value, or `None` if the metric is not graded or has
/// no target row.
pub fn status_for(
    metric: MetricName,
    value: Decimal,
    targets: &[Target],
) -> Option<MetricStatus> {
    let (_, target_name, direction) = GRADED_METRICS.iter().find(|(m, _, _)| *m == metric)?;
    let target = find_target(targets, target_name)?;
    Some(evaluate_status(value, &Thresholds::from(target), *direction))
}

/// Grades every month of every graded metric present in `forecast`.
///
/// The revenue gap is graded on its signed value; the zero floor applies to
/// display only.
pub fn grade_forecast(
    forecast: &[ForecastMetric],
    targets: &[Target],
) -> Vec<MetricGrade> {
    let mut grades = Vec::new();

    for (metric, target_name, direction) in GRADED_METRICS {
        let (Some(row), Some(target)) = (
            find_metric(forecast, metric),
            find_target(targets, target_name),
        ) else {
            continue;
        };
        let thresholds = Thresholds::from(target);

        for (month, value) in row.values.into_iter().enumerate() {
            grades.push(MetricGrade {
                metric,
                month,
                value,
                status: evaluate_status(value, &thresholds, direction),
            });
        }
    }

    grades
}
