mod cell;
mod driver;
mod engine_config;
mod expense_line;
mod forecast_metric;
mod month;
mod revenue_line;
mod scenario;
mod target;

pub use cell::{CellValue, ExtraColumns};
pub use driver::{Driver, SCENARIO_TOGGLE_CATEGORY, SCENARIO_TOGGLE_DRIVER};
pub use engine_config::{ConfigError, EngineConfig};
pub use expense_line::{ExpenseLine, ExpenseType, TOTAL_EXPENSES};
pub use forecast_metric::{ForecastMetric, MetricName, find_metric};
pub use month::{MONTH_COUNT, MONTHS, MonthlyValues, month_index};
pub use revenue_line::{RevenueLine, TOTAL_REVENUE};
pub use scenario::{Scenario, ScenarioParameter};
pub use target::{
    MAXIMUM_BURN_MULTIPLE_TARGET, MINIMUM_CASH_BALANCE_TARGET, MINIMUM_RUNWAY_TARGET,
    MONTHLY_REVENUE_TARGET, Target,
};
