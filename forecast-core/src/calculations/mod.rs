pub mod common;
pub mod cost_model;
pub mod drivers;
pub mod forecast;
pub mod line_items;
pub mod revenue_model;
pub mod scenario;
pub mod targets;

pub use cost_model::{CostModelCalculator, calculate_cost_model};
pub use forecast::{ForecastCalculator, calculate_forecast, displayed_revenue_gap};
pub use revenue_model::{RevenueModelCalculator, calculate_revenue_model};
pub use scenario::{ScenarioError, active_scenario, apply_scenario, resolve_parameters};
pub use targets::{Direction, MetricGrade, MetricStatus, grade_forecast};
