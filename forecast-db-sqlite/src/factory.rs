use async_trait::async_trait;

use forecast_core::db::{StoreConfig, StoreFactory};
use forecast_core::{SnapshotStore, StoreError};

use crate::repository::SqliteSnapshotStore;

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`forecast_core::db::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use forecast_core::db::StoreRegistry;
/// use forecast_db_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted values: a bare file path (created if missing), `:memory:`,
    /// or a `sqlite:` URL.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        let store = SqliteSnapshotStore::new(&config.connection_string).await?;
        store.run_migrations().await?;
        Ok(Box::new(store))
    }
}
