//! Factory for creating record stores.

use std::sync::Arc;

use tracing::info;

use docfields_core::config::{StoreBackend, StoreConfig};
use docfields_core::error::DocfieldsResult;
use docfields_core::traits::RecordStore;

use crate::postgres::PostgresRecordStore;
use crate::sqlite::SqliteRecordStore;

/// Factory for creating record stores.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a record store from configuration.
    ///
    /// PostgreSQL connections are retried per `config.retry`; SQLite opens
    /// immediately.
    pub async fn create(config: &StoreConfig) -> DocfieldsResult<Arc<dyn RecordStore>> {
        match &config.backend {
            StoreBackend::Postgres(pg) => {
                let store = PostgresRecordStore::connect(pg, config.retry).await?;
                Ok(Arc::new(store))
            }
            StoreBackend::Sqlite { path } => {
                info!(path = %path, "Opening SQLite store");
                let store = SqliteRecordStore::open(path)?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Create an in-memory SQLite store.
    pub fn in_memory() -> DocfieldsResult<Arc<dyn RecordStore>> {
        Ok(Arc::new(SqliteRecordStore::in_memory()?))
    }
}
