//! Consolidated forecast calculation.
//!
//! Consumes the two model totals and produces the fixed set of KPI rows:
//! revenue, expenses, net income, ending cash, runway, burn multiple and
//! the gap to the monthly revenue target.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{coerce, max, round_half_up};
use crate::calculations::targets::find_target;
use crate::models::{
    EngineConfig, ExpenseLine, ForecastMetric, MONTH_COUNT, MONTHLY_REVENUE_TARGET, MetricName,
    MonthlyValues, RevenueLine, TOTAL_EXPENSES, TOTAL_REVENUE, Target,
};

/// Builds the forecast table from model totals and targets.
#[derive(Debug, Clone, Copy)]
pub struct ForecastCalculator<'a> {
    config: &'a EngineConfig,
}

impl<'a> ForecastCalculator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Computes the forecast rows in [`MetricName::ALL`] order.
    ///
    /// A missing total row reads as zeros; the output shape never changes.
    pub fn calculate(
        &self,
        revenue_model: &[RevenueLine],
        cost_model: &[ExpenseLine],
        targets: &[Target],
    ) -> Vec<ForecastMetric> {
        let revenue = revenue_total(revenue_model);
        let expenses = expense_total(cost_model);
        let net_income: MonthlyValues<Decimal> =
            std::array::from_fn(|m| revenue[m].saturating_sub(expenses[m]));
        let burn: MonthlyValues<Decimal> =
            std::array::from_fn(|m| expenses[m].saturating_sub(revenue[m]));
        let cash = self.ending_cash(&net_income);
        let runway = self.runway(&cash, &burn);
        let burn_multiple = self.burn_multiple(&revenue, &burn);

        let revenue_target = coerce_target(targets, MONTHLY_REVENUE_TARGET);
        let revenue_gap: MonthlyValues<Decimal> =
            std::array::from_fn(|m| revenue_target.saturating_sub(revenue[m]));

        let sentinel = self.config.runway_sentinel;
        let rows = vec![
            metric_row(
                MetricName::Revenue,
                "=Rev_Model!C23".to_string(),
                revenue,
                "Total monthly revenue",
            ),
            metric_row(
                MetricName::Expenses,
                "=Cost_Model!C19".to_string(),
                expenses,
                "Total monthly expenses",
            ),
            metric_row(
                MetricName::NetIncome,
                "=C3-C4".to_string(),
                net_income,
                "Monthly profit/loss",
            ),
            metric_row(
                MetricName::EndingCashBalance,
                "=B6+C5".to_string(),
                cash,
                "Cumulative cash position",
            ),
            metric_row(
                MetricName::RunwayMonths,
                format!("=IF(C4>C3, C6/(C4-C3), {sentinel})"),
                runway,
                "Months of cash at trailing burn",
            ),
            metric_row(
                MetricName::BurnMultiple,
                "=MAX(C4-C3, 0)/C3".to_string(),
                burn_multiple,
                "Net burn per unit of revenue",
            ),
            metric_row(
                MetricName::RevenueGap,
                "=Targets!B2-C3".to_string(),
                revenue_gap,
                "Shortfall against monthly revenue target",
            ),
        ];

        debug!(rows = rows.len(), "forecast calculated");
        rows
    }

    fn ending_cash(
        &self,
        net_income: &MonthlyValues<Decimal>,
    ) -> MonthlyValues<Decimal> {
        let mut cash = [Decimal::ZERO; MONTH_COUNT];
        let mut balance = self.config.opening_cash_balance;
        for (slot, income) in cash.iter_mut().zip(net_income) {
            balance = balance.saturating_add(*income);
            *slot = balance;
        }
        cash
    }

    /// Cash divided by the mean burn over the trailing window.
    ///
    /// Early months average over however many months exist so far.
    fn runway(
        &self,
        cash: &MonthlyValues<Decimal>,
        burn: &MonthlyValues<Decimal>,
    ) -> MonthlyValues<Decimal> {
        let window = self.config.burn_window_months.max(1);
        let sentinel = self.config.runway_sentinel;

        std::array::from_fn(|m| {
            let start = (m + 1).saturating_sub(window);
            let months = &burn[start..=m];
            let total = months
                .iter()
                .fold(Decimal::ZERO, |acc, b| acc.saturating_add(*b));
            let trailing = total / Decimal::from(months.len());

            if trailing <= Decimal::ZERO {
                return sentinel;
            }
            match cash[m].checked_div(trailing) {
                Some(ratio) => max(round_half_up(ratio), Decimal::ZERO),
                None => sentinel,
            }
        })
    }

    fn burn_multiple(
        &self,
        revenue: &MonthlyValues<Decimal>,
        burn: &MonthlyValues<Decimal>,
    ) -> MonthlyValues<Decimal> {
        let sentinel = self.config.runway_sentinel;

        std::array::from_fn(|m| {
            let net_burn = max(burn[m], Decimal::ZERO);
            if net_burn.is_zero() {
                Decimal::ZERO
            } else if revenue[m] <= Decimal::ZERO {
                sentinel
            } else {
                net_burn
                    .checked_div(revenue[m])
                    .map(round_half_up)
                    .unwrap_or(sentinel)
            }
        })
    }
}

/// Computes the forecast with the default [`EngineConfig`].
pub fn calculate_forecast(
    revenue_model: &[RevenueLine],
    cost_model: &[ExpenseLine],
    targets: &[Target],
) -> Vec<ForecastMetric> {
    ForecastCalculator::new(&EngineConfig::default()).calculate(revenue_model, cost_model, targets)
}

/// Revenue gap as shown to users: a surplus reads as no gap.
pub fn displayed_revenue_gap(gap: Decimal) -> Decimal {
    max(gap, Decimal::ZERO)
}

fn revenue_total(revenue_model: &[RevenueLine]) -> MonthlyValues<Decimal> {
    revenue_model
        .iter()
        .find(|line| line.stream == TOTAL_REVENUE)
        .map(|line| line.values)
        .unwrap_or([Decimal::ZERO; MONTH_COUNT])
}

fn expense_total(cost_model: &[ExpenseLine]) -> MonthlyValues<Decimal> {
    cost_model
        .iter()
        .find(|line| line.category == TOTAL_EXPENSES)
        .map(|line| line.values)
        .unwrap_or([Decimal::ZERO; MONTH_COUNT])
}

fn coerce_target(
    targets: &[Target],
    metric: &str,
) -> Decimal {
    find_target(targets, metric)
        .map(|t| coerce(&t.target))
        .unwrap_or(Decimal::ZERO)
}

fn metric_row(
    name: MetricName,
    formula: String,
    values: MonthlyValues<Decimal>,
    notes: &str,
) -> ForecastMetric {
    ForecastMetric {
        metric: name.as_str().to_string(),
        formula,
        values,
        notes: notes.to_string(),
        ..Default::default()
    }
}
