//! Snapshot store backed by a directory of CSV files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use forecast_core::db::{StoreConfig, StoreFactory};
use forecast_core::{Dataset, SnapshotStore, StoreError};

/// Reads and writes `<root>/<dataset file name>`.
///
/// Saves go through a temporary file and a rename, so a reader never sees a
/// half-written dataset. The directory keeps no history; save messages are
/// only logged.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(
        &self,
        dataset: Dataset,
    ) -> PathBuf {
        self.root.join(dataset.file_name())
    }
}

fn io_error(
    path: &Path,
    err: std::io::Error,
) -> StoreError {
    StoreError::Io(format!("{}: {err}", path.display()))
}

#[async_trait]
impl SnapshotStore for DirectoryStore {
    fn backend_name(&self) -> &'static str {
        "dir"
    }

    async fn load(
        &self,
        dataset: Dataset,
    ) -> Result<Option<String>, StoreError> {
        let path = self.path_for(dataset);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    async fn save(
        &self,
        dataset: Dataset,
        content: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let path = self.path_for(dataset);
        let staging = path.with_extension("csv.tmp");
        tokio::fs::write(&staging, content)
            .await
            .map_err(|e| io_error(&staging, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        debug!(path = %path.display(), message, "dataset written");
        Ok(())
    }
}

/// Factory for the `dir` backend. The connection string is the directory.
pub struct DirectoryStoreFactory;

#[async_trait]
impl StoreFactory for DirectoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "dir"
    }

    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        if config.connection_string.trim().is_empty() {
            return Err(StoreError::Configuration(
                "dir backend needs a directory path".to_string(),
            ));
        }
        Ok(Box::new(DirectoryStore::new(&config.connection_string)))
    }
}
