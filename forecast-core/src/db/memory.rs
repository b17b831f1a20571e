//! Process-local snapshot store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::factory::{StoreConfig, StoreFactory};
use super::repository::{Dataset, SnapshotStore, StoreError};

/// Keeps the latest content of every dataset in memory, with the message of
/// its last save.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<Dataset, (String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message recorded by the most recent save of `dataset`.
    pub fn last_message(
        &self,
        dataset: Dataset,
    ) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&dataset).map(|(_, message)| message.clone()))
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn load(
        &self,
        dataset: Dataset,
    ) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(entries.get(&dataset).map(|(content, _)| content.clone()))
    }

    async fn save(
        &self,
        dataset: Dataset,
        content: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        entries.insert(dataset, (content.to_string(), message.to_string()));
        Ok(())
    }
}

/// Factory for the `memory` backend. Every store it creates starts empty.
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        Ok(Box::new(MemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn load_of_unsaved_dataset_is_none() {
        let store = MemoryStore::new();

        assert_eq!(store.load(Dataset::Drivers).await, Ok(None));
    }

    #[tokio::test]
    async fn save_replaces_previous_content() {
        let store = MemoryStore::new();

        store
            .save(Dataset::Targets, "Metric\nA\n", "first")
            .await
            .unwrap();
        store
            .save(Dataset::Targets, "Metric\nB\n", "Update targets data")
            .await
            .unwrap();

        assert_eq!(
            store.load(Dataset::Targets).await,
            Ok(Some("Metric\nB\n".to_string()))
        );
        assert_eq!(
            store.last_message(Dataset::Targets).as_deref(),
            Some("Update targets data")
        );
        assert_eq!(store.load(Dataset::Drivers).await, Ok(None));
    }
}
