use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The six tables that make up a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dataset {
    Drivers,
    RevenueModel,
    CostModel,
    Forecast,
    Scenarios,
    Targets,
}

impl Dataset {
    /// Every dataset, in load and save order.
    pub const ALL: [Dataset; 6] = [
        Self::Drivers,
        Self::RevenueModel,
        Self::CostModel,
        Self::Forecast,
        Self::Scenarios,
        Self::Targets,
    ];

    /// File name of the dataset inside a snapshot.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Drivers => "drivers.csv",
            Self::RevenueModel => "rev-model.csv",
            Self::CostModel => "cost-model.csv",
            Self::Forecast => "forecast.csv",
            Self::Scenarios => "case-switch.csv",
            Self::Targets => "targets.csv",
        }
    }

    /// Message recorded alongside every save of this dataset.
    pub fn save_message(&self) -> &'static str {
        match self {
            Self::Drivers => "Update drivers data",
            Self::RevenueModel => "Update revenue model data",
            Self::CostModel => "Update cost model data",
            Self::Forecast => "Update forecast data",
            Self::Scenarios => "Update scenarios data",
            Self::Targets => "Update targets data",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.file_name() == name)
    }

    /// Whether the dataset is produced by recalculation rather than edited.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::RevenueModel | Self::CostModel | Self::Forecast)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persistence for snapshot datasets, stored as delimited text.
///
/// Each dataset is loaded and saved on its own; a failure on one must not
/// affect the others.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Name of the backend that produced this store.
    fn backend_name(&self) -> &'static str;

    /// Latest content of `dataset`, or `None` if it was never saved.
    async fn load(
        &self,
        dataset: Dataset,
    ) -> Result<Option<String>, StoreError>;

    async fn save(
        &self,
        dataset: Dataset,
        content: &str,
        message: &str,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dataset_file_names_round_trip() {
        for dataset in Dataset::ALL {
            assert_eq!(Dataset::from_file_name(dataset.file_name()), Some(dataset));
        }
        assert_eq!(Dataset::from_file_name("budget.csv"), None);
    }

    #[test]
    fn scenarios_live_in_case_switch_file() {
        assert_eq!(Dataset::Scenarios.file_name(), "case-switch.csv");
        assert_eq!(Dataset::Scenarios.save_message(), "Update scenarios data");
    }

    #[test]
    fn only_model_tables_are_derived() {
        let derived: Vec<Dataset> = Dataset::ALL.into_iter().filter(Dataset::is_derived).collect();

        assert_eq!(
            derived,
            vec![Dataset::RevenueModel, Dataset::CostModel, Dataset::Forecast]
        );
    }
}
