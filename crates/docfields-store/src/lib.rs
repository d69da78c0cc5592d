//! docfields-store - Persistence stores for docfields.
//!
//! Both backends hold the `extracted_data` table and implement
//! [`RecordStore`](docfields_core::traits::RecordStore).
//!
//! # Supported Backends
//!
//! - **PostgreSQL** - pooled via deadpool-postgres, connect-with-retry
//! - **SQLite** - single connection, for local runs and tests

mod factory;
mod postgres;
mod sqlite;

pub use factory::StoreFactory;
pub use postgres::PostgresRecordStore;
pub use sqlite::SqliteRecordStore;

// Re-export core types for convenience
pub use docfields_core::config::{StoreBackend, StoreConfig};
pub use docfields_core::traits::RecordStore;
