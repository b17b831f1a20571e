//! Loading and saving whole snapshots.
//!
//! Datasets are independent: each one is loaded or saved on its own and its
//! outcome is recorded in a report. One failing dataset never discards the
//! others or the in-memory tables.

use thiserror::Error;
use tracing::{info, warn};

use forecast_core::{Dataset, ForecastEngine, Snapshot, SnapshotStore, StoreError};

use crate::tables::{CsvLoadError, read_table, write_table};

/// Why a single dataset could not be loaded or saved.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Csv(#[from] CsvLoadError),
}

/// Outcome of loading one dataset.
#[derive(Debug)]
pub enum LoadStatus {
    /// Parsed successfully.
    Loaded { rows: usize },
    /// The store has no content for the dataset; the table is empty.
    Missing,
    /// Loading or parsing failed; the table is empty.
    Failed(DatasetError),
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub datasets: Vec<(Dataset, LoadStatus)>,
}

impl LoadReport {
    pub fn status(
        &self,
        dataset: Dataset,
    ) -> Option<&LoadStatus> {
        self.datasets
            .iter()
            .find(|(d, _)| *d == dataset)
            .map(|(_, status)| status)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Dataset, &DatasetError)> {
        self.datasets.iter().filter_map(|(d, status)| match status {
            LoadStatus::Failed(err) => Some((*d, err)),
            _ => None,
        })
    }

    /// True when every dataset loaded.
    pub fn is_complete(&self) -> bool {
        self.datasets
            .iter()
            .all(|(_, status)| matches!(status, LoadStatus::Loaded { .. }))
    }
}

#[derive(Debug, Default)]
pub struct SaveReport {
    pub datasets: Vec<(Dataset, Result<(), DatasetError>)>,
}

impl SaveReport {
    pub fn saved(&self) -> usize {
        self.datasets.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (Dataset, &DatasetError)> {
        self.datasets
            .iter()
            .filter_map(|(d, r)| r.as_ref().err().map(|err| (*d, err)))
    }

    pub fn is_complete(&self) -> bool {
        self.datasets.iter().all(|(_, r)| r.is_ok())
    }
}

/// Parse `content` into the matching table of `snapshot`, returning the row
/// count.
///
/// # Errors
///
/// Returns [`CsvLoadError`] and leaves `snapshot` unchanged if parsing fails.
pub fn decode_dataset(
    snapshot: &mut Snapshot,
    dataset: Dataset,
    content: &str,
) -> Result<usize, CsvLoadError> {
    let rows = match dataset {
        Dataset::Drivers => {
            snapshot.drivers = read_table(content)?;
            snapshot.drivers.len()
        }
        Dataset::RevenueModel => {
            snapshot.revenue_model = read_table(content)?;
            snapshot.revenue_model.len()
        }
        Dataset::CostModel => {
            snapshot.cost_model = read_table(content)?;
            snapshot.cost_model.len()
        }
        Dataset::Forecast => {
            snapshot.forecast = read_table(content)?;
            snapshot.forecast.len()
        }
        Dataset::Scenarios => {
            snapshot.scenarios = read_table(content)?;
            snapshot.scenarios.len()
        }
        Dataset::Targets => {
            snapshot.targets = read_table(content)?;
            snapshot.targets.len()
        }
    };
    Ok(rows)
}

/// Encode one table of `snapshot` as CSV text.
pub fn encode_dataset(
    snapshot: &Snapshot,
    dataset: Dataset,
) -> Result<String, CsvLoadError> {
    match dataset {
        Dataset::Drivers => write_table(&snapshot.drivers),
        Dataset::RevenueModel => write_table(&snapshot.revenue_model),
        Dataset::CostModel => write_table(&snapshot.cost_model),
        Dataset::Forecast => write_table(&snapshot.forecast),
        Dataset::Scenarios => write_table(&snapshot.scenarios),
        Dataset::Targets => write_table(&snapshot.targets),
    }
}

/// Load all six datasets from `store`.
///
/// A missing or failing dataset leaves its table empty and is recorded in
/// the report.
pub async fn load_snapshot(store: &dyn SnapshotStore) -> (Snapshot, LoadReport) {
    let mut snapshot = Snapshot::default();
    let mut report = LoadReport::default();

    for dataset in Dataset::ALL {
        let status = match store.load(dataset).await {
            Ok(Some(content)) => match decode_dataset(&mut snapshot, dataset, &content) {
                Ok(rows) => LoadStatus::Loaded { rows },
                Err(err) => LoadStatus::Failed(err.into()),
            },
            Ok(None) => LoadStatus::Missing,
            Err(err) => LoadStatus::Failed(err.into()),
        };

        match &status {
            LoadStatus::Failed(err) => {
                warn!(dataset = dataset.file_name(), error = %err, "dataset failed to load")
            }
            LoadStatus::Missing => warn!(dataset = dataset.file_name(), "dataset not found"),
            LoadStatus::Loaded { .. } => {}
        }
        report.datasets.push((dataset, status));
    }

    info!(
        backend = store.backend_name(),
        complete = report.is_complete(),
        "snapshot loaded"
    );
    (snapshot, report)
}

/// Save every table of `engine` to `store` with the dataset's save message.
pub async fn save_snapshot(
    store: &dyn SnapshotStore,
    engine: &ForecastEngine,
) -> SaveReport {
    let snapshot = engine.snapshot();
    let mut report = SaveReport::default();

    for dataset in Dataset::ALL {
        let result = match encode_dataset(&snapshot, dataset) {
            Ok(content) => store
                .save(dataset, &content, dataset.save_message())
                .await
                .map_err(DatasetError::from),
            Err(err) => Err(err.into()),
        };

        if let Err(err) = &result {
            warn!(dataset = dataset.file_name(), error = %err, "dataset failed to save");
        }
        report.datasets.push((dataset, result));
    }

    info!(
        backend = store.backend_name(),
        saved = report.saved(),
        "snapshot saved"
    );
    report
}

/// Copy the raw text of every dataset present in `from` into `to`.
///
/// Datasets absent from `from` are skipped and not reported.
pub async fn copy_datasets(
    from: &dyn SnapshotStore,
    to: &dyn SnapshotStore,
) -> SaveReport {
    let mut report = SaveReport::default();

    for dataset in Dataset::ALL {
        let result = match from.load(dataset).await {
            Ok(Some(content)) => to
                .save(dataset, &content, dataset.save_message())
                .await
                .map_err(DatasetError::from),
            Ok(None) => continue,
            Err(err) => Err(err.into()),
        };
        report.datasets.push((dataset, result));
    }

    report
}
