//! Persistence store trait.

use async_trait::async_trait;

use crate::error::DocfieldsResult;
use crate::types::{ExtractedFields, ExtractedRecord};

/// Store for extracted-field records.
///
/// Each call acquires its own connection and releases it on every exit
/// path. `insert` runs in a single transaction; on failure nothing is
/// written and the error is a [`crate::DocfieldsError::Persistence`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, returning it with its id and creation time.
    async fn insert(&self, fields: &ExtractedFields) -> DocfieldsResult<ExtractedRecord>;

    /// Fetch a record by id.
    async fn get(&self, id: i64) -> DocfieldsResult<Option<ExtractedRecord>>;

    /// Number of stored records.
    async fn count(&self) -> DocfieldsResult<u64>;

    /// Trivial round-trip query (`SELECT 1`).
    async fn ping(&self) -> DocfieldsResult<i32>;

    /// Backend name for logging.
    fn backend_name(&self) -> &str;
}
