use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cell::{CellValue, ExtraColumns};

/// The named scenario selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Optimistic,
    #[default]
    BaseCase,
    Conservative,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Self::Optimistic, Self::BaseCase, Self::Conservative];

    /// Column header / selector text, e.g. `Base_Case`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimistic => "Optimistic",
            Self::BaseCase => "Base_Case",
            Self::Conservative => "Conservative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Optimistic" => Some(Self::Optimistic),
            "Base_Case" => Some(Self::BaseCase),
            "Conservative" => Some(Self::Conservative),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimistic => "Optimistic",
            Self::BaseCase => "Base Case",
            Self::Conservative => "Conservative",
        }
    }

    /// Numeric code written into the scenario toggle driver.
    pub fn toggle_code(&self) -> Decimal {
        match self {
            Self::Optimistic => Decimal::ONE,
            Self::BaseCase => Decimal::TWO,
            Self::Conservative => Decimal::from(3),
        }
    }

    pub fn from_toggle_code(code: Decimal) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.toggle_code() == code)
    }
}

/// One row of the scenarios table.
///
/// `current` is derived: it is overwritten with the active scenario's column
/// every time a scenario is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParameter {
    pub name: String,
    pub base_case: CellValue,
    pub optimistic: CellValue,
    pub conservative: CellValue,
    pub current: CellValue,
    pub notes: String,
    pub extra: ExtraColumns,
}

impl ScenarioParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The stored cell for `scenario`.
    pub fn value_for(
        &self,
        scenario: Scenario,
    ) -> &CellValue {
        match scenario {
            Scenario::Optimistic => &self.optimistic,
            Scenario::BaseCase => &self.base_case,
            Scenario::Conservative => &self.conservative,
        }
    }
}
