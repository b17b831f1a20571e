//! The forecast engine: owns the user-edited tables and publishes the
//! derived ones.
//!
//! Every edit replaces an input table and runs a full recalculation. The
//! three derived tables are computed together and then published as one
//! [`Arc<DerivedTables>`], so a reader holding the previous `Arc` never sees
//! a mix of old and new rows.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::cost_model::calculate_cost_model;
use crate::calculations::drivers::find_driver_mut;
use crate::calculations::forecast::ForecastCalculator;
use crate::calculations::revenue_model::calculate_revenue_model;
use crate::calculations::scenario::{self, ScenarioError};
use crate::calculations::targets::{MetricGrade, grade_forecast};
use crate::models::{
    CellValue, ConfigError, Driver, EngineConfig, ExpenseLine, ForecastMetric, RevenueLine,
    Scenario, ScenarioParameter, Target, month_index,
};

/// The recalculated tables, always produced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedTables {
    pub revenue_model: Vec<RevenueLine>,
    pub cost_model: Vec<ExpenseLine>,
    pub forecast: Vec<ForecastMetric>,
}

/// All six tables of a forecast, as loaded from or saved to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub drivers: Vec<Driver>,
    pub revenue_model: Vec<RevenueLine>,
    pub cost_model: Vec<ExpenseLine>,
    pub forecast: Vec<ForecastMetric>,
    pub scenarios: Vec<ScenarioParameter>,
    pub targets: Vec<Target>,
}

/// Errors from edit operations on the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No driver row has the given key.
    #[error("driver '{category}/{name}' not found")]
    DriverNotFound { category: String, name: String },

    /// The month label is not on the forecast horizon.
    #[error("unknown month '{0}'")]
    UnknownMonth(String),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Recomputes all derived tables from the inputs.
pub fn recalculate(
    drivers: &[Driver],
    scenarios: &[ScenarioParameter],
    targets: &[Target],
    config: &EngineConfig,
) -> DerivedTables {
    let revenue_model = calculate_revenue_model(drivers, scenarios);
    let cost_model = calculate_cost_model(drivers, scenarios);
    let forecast = ForecastCalculator::new(config).calculate(&revenue_model, &cost_model, targets);

    DerivedTables {
        revenue_model,
        cost_model,
        forecast,
    }
}

/// Owns the input tables and the published derived tables.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: EngineConfig,
    drivers: Vec<Driver>,
    scenarios: Vec<ScenarioParameter>,
    targets: Vec<Target>,
    derived: Arc<DerivedTables>,
}

impl ForecastEngine {
    /// An engine with empty inputs and a recalculated (all-zero) forecast.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::from_inputs(config, Vec::new(), Vec::new(), Vec::new())
    }

    /// Builds an engine from input tables and recalculates immediately.
    pub fn from_inputs(
        config: EngineConfig,
        drivers: Vec<Driver>,
        scenarios: Vec<ScenarioParameter>,
        targets: Vec<Target>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            config,
            drivers,
            scenarios,
            targets,
            derived: Arc::new(DerivedTables::default()),
        };
        engine.recalculate();
        Ok(engine)
    }

    /// Restores an engine from a snapshot, publishing its stored derived
    /// tables as they are. Parameter `current` values are re-resolved from
    /// the toggle; nothing else is recalculated until the first edit or an
    /// explicit [`recalculate`](Self::recalculate).
    pub fn from_snapshot(
        config: EngineConfig,
        snapshot: Snapshot,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            config,
            drivers: snapshot.drivers,
            scenarios: snapshot.scenarios,
            targets: snapshot.targets,
            derived: Arc::new(DerivedTables {
                revenue_model: snapshot.revenue_model,
                cost_model: snapshot.cost_model,
                forecast: snapshot.forecast,
            }),
        };
        engine.resolve_scenarios();
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn scenarios(&self) -> &[ScenarioParameter] {
        &self.scenarios
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The currently published derived tables.
    pub fn derived(&self) -> Arc<DerivedTables> {
        Arc::clone(&self.derived)
    }

    /// Copies every table into a [`Snapshot`].
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            drivers: self.drivers.clone(),
            revenue_model: self.derived.revenue_model.clone(),
            cost_model: self.derived.cost_model.clone(),
            forecast: self.derived.forecast.clone(),
            scenarios: self.scenarios.clone(),
            targets: self.targets.clone(),
        }
    }

    /// Scenario currently encoded in the toggle driver.
    pub fn active_scenario(&self) -> Option<Scenario> {
        scenario::active_scenario(&self.drivers)
    }

    /// Re-resolves parameters for the active scenario, then recomputes and
    /// publishes the derived tables.
    pub fn recalculate(&mut self) -> Arc<DerivedTables> {
        self.resolve_scenarios();
        let tables = recalculate(&self.drivers, &self.scenarios, &self.targets, &self.config);
        self.publish(tables)
    }

    pub fn update_config(
        &mut self,
        config: EngineConfig,
    ) -> Result<Arc<DerivedTables>, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self.recalculate())
    }

    pub fn update_drivers(
        &mut self,
        drivers: Vec<Driver>,
    ) -> Arc<DerivedTables> {
        self.drivers = drivers;
        self.recalculate()
    }

    /// Sets one driver cell and recalculates.
    ///
    /// # Errors
    ///
    /// Fails without modifying anything if the driver or month is unknown.
    pub fn set_driver_value(
        &mut self,
        category: &str,
        name: &str,
        month: &str,
        value: CellValue,
    ) -> Result<Arc<DerivedTables>, EngineError> {
        let index = month_index(month).ok_or_else(|| EngineError::UnknownMonth(month.to_string()))?;
        let driver = find_driver_mut(&mut self.drivers, category, name).ok_or_else(|| {
            EngineError::DriverNotFound {
                category: category.to_string(),
                name: name.to_string(),
            }
        })?;

        driver.values[index] = value;
        debug!(category, name, month, "driver value set");
        Ok(self.recalculate())
    }

    /// Replaces the scenario table. `current` is recomputed from the active
    /// scenario (Base Case if the toggle is absent or unrecognised).
    pub fn update_scenarios(
        &mut self,
        scenarios: Vec<ScenarioParameter>,
    ) -> Arc<DerivedTables> {
        self.scenarios = scenarios;
        self.recalculate()
    }

    pub fn update_targets(
        &mut self,
        targets: Vec<Target>,
    ) -> Arc<DerivedTables> {
        self.targets = targets;
        self.recalculate()
    }

    /// Switches scenario: updates the toggle driver, re-resolves every
    /// parameter and recalculates.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ToggleNotFound`] with all state unchanged if
    /// the drivers have no toggle row.
    pub fn apply_scenario(
        &mut self,
        selected: Scenario,
    ) -> Result<Arc<DerivedTables>, EngineError> {
        let drivers = scenario::apply_scenario(selected, &self.drivers)?;
        self.drivers = drivers;
        info!(scenario = selected.as_str(), "scenario applied");
        Ok(self.recalculate())
    }

    /// Publishes a hand-edited revenue model. It is kept only until the next
    /// recalculation.
    pub fn override_revenue_model(
        &mut self,
        revenue_model: Vec<RevenueLine>,
    ) -> Arc<DerivedTables> {
        let tables = DerivedTables {
            revenue_model,
            ..(*self.derived).clone()
        };
        warn!("revenue model overridden; the next recalculation replaces it");
        self.publish(tables)
    }

    pub fn override_cost_model(
        &mut self,
        cost_model: Vec<ExpenseLine>,
    ) -> Arc<DerivedTables> {
        let tables = DerivedTables {
            cost_model,
            ..(*self.derived).clone()
        };
        warn!("cost model overridden; the next recalculation replaces it");
        self.publish(tables)
    }

    pub fn override_forecast(
        &mut self,
        forecast: Vec<ForecastMetric>,
    ) -> Arc<DerivedTables> {
        let tables = DerivedTables {
            forecast,
            ..(*self.derived).clone()
        };
        warn!("forecast overridden; the next recalculation replaces it");
        self.publish(tables)
    }

    /// Grades the published forecast against the targets.
    pub fn grades(&self) -> Vec<MetricGrade> {
        grade_forecast(&self.derived.forecast, &self.targets)
    }

    /// Sets every parameter's `current` from the toggle driver, falling back
    /// to Base Case.
    fn resolve_scenarios(&mut self) {
        let active = self.active_scenario().unwrap_or_default();
        self.scenarios = scenario::resolve_parameters(active, &self.scenarios);
    }

    fn publish(
        &mut self,
        tables: DerivedTables,
    ) -> Arc<DerivedTables> {
        self.derived = Arc::new(tables);
        info!(
            revenue_lines = self.derived.revenue_model.len(),
            cost_lines = self.derived.cost_model.len(),
            forecast_rows = self.derived.forecast.len(),
            "derived tables published"
        );
        Arc::clone(&self.derived)
    }
}
