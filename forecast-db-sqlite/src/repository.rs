use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use forecast_core::{Dataset, SnapshotStore, StoreError};

/// Versioned snapshot store in SQLite.
///
/// Saving never overwrites: each save appends a row with the next version
/// number for that dataset, and loading returns the highest version.
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

/// One saved version of a dataset, without its content.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DatasetVersion {
    pub version: i64,
    pub message: String,
    pub saved_at: DateTime<Utc>,
}

/// Map a connection string to sqlx options.
///
/// * `sqlite:...` URLs are used as given.
/// * `:memory:` is an ephemeral in-memory database.
/// * Anything else is a file path, created if missing.
fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions, StoreError> {
    let trimmed = connection_string.trim();
    if trimmed.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(trimmed)
            .map_err(|e| StoreError::Configuration(e.to_string()))
    } else if trimmed == ":memory:" {
        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Configuration(e.to_string()))
    } else if trimmed.is_empty() {
        Err(StoreError::Configuration(
            "sqlite backend needs a database path".to_string(),
        ))
    } else {
        Ok(SqliteConnectOptions::new()
            .filename(trimmed)
            .create_if_missing(true))
    }
}

impl SqliteSnapshotStore {
    pub async fn new(connection_string: &str) -> Result<Self, StoreError> {
        let options = connect_options(connection_string)?;
        // An in-memory database lives and dies with its connection.
        let max_connections = if connection_string.contains(":memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every saved version of `dataset`, newest first.
    pub async fn history(
        &self,
        dataset: Dataset,
    ) -> Result<Vec<DatasetVersion>, StoreError> {
        sqlx::query_as::<_, DatasetVersion>(
            "SELECT version, message, saved_at
             FROM dataset_version
             WHERE dataset = ?
             ORDER BY version DESC",
        )
        .bind(dataset.file_name())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Content of a specific version, if it exists.
    pub async fn load_version(
        &self,
        dataset: Dataset,
        version: i64,
    ) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT content FROM dataset_version WHERE dataset = ? AND version = ?",
        )
        .bind(dataset.file_name())
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn load(
        &self,
        dataset: Dataset,
    ) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT content
             FROM dataset_version
             WHERE dataset = ?
             ORDER BY version DESC
             LIMIT 1",
        )
        .bind(dataset.file_name())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn save(
        &self,
        dataset: Dataset,
        content: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO dataset_version (dataset, version, content, message, saved_at)
             SELECT ?1, COALESCE(MAX(version), 0) + 1, ?2, ?3, ?4
             FROM dataset_version
             WHERE dataset = ?1",
        )
        .bind(dataset.file_name())
        .bind(content)
        .bind(message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(
            dataset = dataset.file_name(),
            message,
            rows = result.rows_affected(),
            "dataset version saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_test_db() -> SqliteSnapshotStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let store = SqliteSnapshotStore::new_with_pool(pool).await;
        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");
        store
    }

    // =========================================================================
    // connect_options tests
    // =========================================================================

    #[test]
    fn connect_options_accepts_paths_and_urls() {
        assert!(connect_options("forecast.db").is_ok());
        assert!(connect_options(":memory:").is_ok());
        assert!(connect_options("sqlite://forecast.db?mode=rwc").is_ok());
    }

    #[test]
    fn connect_options_rejects_empty() {
        assert!(matches!(
            connect_options("  "),
            Err(StoreError::Configuration(_))
        ));
    }

    // =========================================================================
    // Load and save tests
    // =========================================================================

    #[tokio::test]
    async fn load_of_unsaved_dataset_is_none() {
        let store = setup_test_db().await;

        assert_eq!(store.load(Dataset::Drivers).await, Ok(None));
    }

    #[tokio::test]
    async fn load_returns_latest_version() {
        let store = setup_test_db().await;

        store
            .save(Dataset::Targets, "Metric\nA\n", "Update targets data")
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
    }

    #[tokio::test]
    async fn datasets_are_versioned_independently() {
        let store = setup_test_db().await;

        store.save(Dataset::Drivers, "a", "first").await.unwrap();
        store.save(Dataset::Forecast, "b", "other").await.unwrap();
        store.save(Dataset::Drivers, "c", "second").await.unwrap();

        let drivers = store.history(Dataset::Drivers).await.unwrap();
        let forecast = store.history(Dataset::Forecast).await.unwrap();

        let versions: Vec<(i64, &str)> = drivers
            .iter()
            .map(|v| (v.version, v.message.as_str()))
            .collect();
        assert_eq!(versions, vec![(2, "second"), (1, "first")]);
        assert_eq!(forecast.len(), 1);
        assert_eq!(forecast[0].version, 1);
    }

    #[tokio::test]
    async fn earlier_versions_remain_readable() {
        let store = setup_test_db().await;

        store.save(Dataset::Scenarios, "v1", "Update scenarios data").await.unwrap();
        store.save(Dataset::Scenarios, "v2", "Update scenarios data").await.unwrap();

        assert_eq!(
            store.load_version(Dataset::Scenarios, 1).await,
            Ok(Some("v1".to_string()))
        );
        assert_eq!(store.load_version(Dataset::Scenarios, 3).await, Ok(None));
    }
}
