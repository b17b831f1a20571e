use serde::{Deserialize, Serialize};

use super::cell::{CellValue, ExtraColumns};
use super::month::{MONTH_COUNT, MonthlyValues};

/// Category of the driver row that carries the active scenario code.
pub const SCENARIO_TOGGLE_CATEGORY: &str = "Scenario";
/// Driver name of the scenario toggle row.
pub const SCENARIO_TOGGLE_DRIVER: &str = "Toggle";

/// A user-supplied monthly assumption, keyed by `(category, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub category: String,
    pub name: String,
    pub values: MonthlyValues<CellValue>,
    pub notes: String,
    pub extra: ExtraColumns,
}

impl Driver {
    /// Creates a driver with every month empty.
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for all nine months.
    pub fn with_values<T: Into<CellValue>>(
        mut self,
        values: [T; MONTH_COUNT],
    ) -> Self {
        self.values = values.map(Into::into);
        self
    }

    pub fn matches(
        &self,
        category: &str,
        name: &str,
    ) -> bool {
        self.category == category && self.name == name
    }

    pub fn is_scenario_toggle(&self) -> bool {
        self.matches(SCENARIO_TOGGLE_CATEGORY, SCENARIO_TOGGLE_DRIVER)
    }
}
