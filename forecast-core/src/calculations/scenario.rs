//! Scenario selection.
//!
//! A scenario is applied in two places: every parameter row gets its
//! `current` value from the selected column, and the scenario toggle driver
//! receives the scenario code in every month so the selection flows through
//! ordinary driver lookups.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::coerce;
use crate::calculations::drivers::find_driver;
use crate::models::{
    CellValue, Driver, SCENARIO_TOGGLE_CATEGORY, SCENARIO_TOGGLE_DRIVER, Scenario,
    ScenarioParameter,
};

/// Errors raised when applying a scenario.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    /// The drivers table has no `Scenario` / `Toggle` row.
    #[error("scenario toggle driver '{SCENARIO_TOGGLE_CATEGORY}/{SCENARIO_TOGGLE_DRIVER}' not found")]
    ToggleNotFound,
}

/// Writes `scenario`'s code into every month of the toggle driver.
///
/// Returns the updated table. The input is never modified, so on
/// [`ScenarioError::ToggleNotFound`] the caller still holds the original.
///
/// # Errors
///
/// Returns [`ScenarioError::ToggleNotFound`] if no toggle row exists.
pub fn apply_scenario(
    scenario: Scenario,
    drivers: &[Driver],
) -> Result<Vec<Driver>, ScenarioError> {
    let index = drivers
        .iter()
        .position(Driver::is_scenario_toggle)
        .ok_or(ScenarioError::ToggleNotFound)?;

    let mut updated = drivers.to_vec();
    let code = CellValue::Number(scenario.toggle_code());
    updated[index].values = std::array::from_fn(|_| code.clone());

    debug!(scenario = scenario.as_str(), "scenario toggle updated");
    Ok(updated)
}

/// The scenario encoded in the toggle driver's first month, if any.
pub fn active_scenario(drivers: &[Driver]) -> Option<Scenario> {
    find_driver(drivers, SCENARIO_TOGGLE_CATEGORY, SCENARIO_TOGGLE_DRIVER)
        .and_then(|toggle| toggle.values.first())
        .map(coerce)
        .and_then(Scenario::from_toggle_code)
}

/// Recomputes `current` on every parameter row for `scenario`.
pub fn resolve_parameters(
    scenario: Scenario,
    parameters: &[ScenarioParameter],
) -> Vec<ScenarioParameter> {
    parameters
        .iter()
        .map(|p| ScenarioParameter {
            current: CellValue::Number(coerce(p.value_for(scenario))),
            ..p.clone()
        })
        .collect()
}

/// The current value of a named parameter; first match wins.
pub fn parameter_value(
    parameters: &[ScenarioParameter],
    name: &str,
) -> Option<Decimal> {
    parameters
        .iter()
        .find(|p| p.name == name)
        .map(|p| coerce(&p.current))
}
