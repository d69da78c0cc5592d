//! SQLite record store.
//!
//! Intended for local runs and tests. Column widths are enforced with
//! `CHECK(length(..))` constraints so overflow fails the insert the same
//! way a PostgreSQL varchar limit would.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use docfields_core::error::{DocfieldsError, DocfieldsResult};
use docfields_core::traits::RecordStore;
use docfields_core::types::{
    ExtractedFields, ExtractedRecord, CEP_MAX_LEN, CNPJ_MAX_LEN, ISSUE_DATE_MAX_LEN,
    TOTAL_VALUE_MAX_LEN,
};

const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-backed [`RecordStore`].
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open (or create) a database file.
    pub fn open(db_path: impl AsRef<Path>) -> DocfieldsResult<Self> {
        let conn = if db_path.as_ref().to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            if let Some(parent) = db_path.as_ref().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DocfieldsError::db_connection(format!(
                            "Failed to create database directory: {}",
                            e
                        ))
                    })?;
                }
            }
            Connection::open(db_path.as_ref())
        }
        .map_err(|e| DocfieldsError::db_connection(format!("Failed to open SQLite database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.create_table()?;

        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> DocfieldsResult<Self> {
        Self::open(":memory:")
    }

    fn create_table(&self) -> DocfieldsResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS extracted_data (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    cnpj         TEXT NOT NULL DEFAULT '' CHECK(length(cnpj) <= {}),
                    cep          TEXT NOT NULL DEFAULT '' CHECK(length(cep) <= {}),
                    data_emissao TEXT NOT NULL DEFAULT '' CHECK(length(data_emissao) <= {}),
                    valor_total  TEXT NOT NULL DEFAULT '' CHECK(length(valor_total) <= {}),
                    created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
                CNPJ_MAX_LEN, CEP_MAX_LEN, ISSUE_DATE_MAX_LEN, TOTAL_VALUE_MAX_LEN
            ),
            [],
        )
        .map_err(|e| DocfieldsError::db_connection(format!("Failed to create schema: {}", e)))?;

        Ok(())
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> DocfieldsResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> DocfieldsResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| DocfieldsError::persistence(format!("SQLite task failed: {}", e)))?
    }
}

fn lock(conn: &Mutex<Connection>) -> DocfieldsResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| DocfieldsError::persistence("SQLite connection lock poisoned"))
}

fn parse_timestamp(raw: &str) -> DocfieldsResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| DocfieldsError::persistence(format!("Invalid created_at '{}': {}", raw, e)))
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<(i64, ExtractedFields, String)> {
    Ok((
        row.get(0)?,
        ExtractedFields {
            cnpj: row.get(1)?,
            cep: row.get(2)?,
            issue_date: row.get(3)?,
            total_value: row.get(4)?,
        },
        row.get(5)?,
    ))
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, fields: &ExtractedFields) -> DocfieldsResult<ExtractedRecord> {
        let fields = fields.clone();
        self.with_conn(move |conn| {
            // Dropping an uncommitted transaction rolls it back.
            let tx = conn
                .transaction()
                .map_err(|e| DocfieldsError::persistence_with_source("Failed to begin transaction", e))?;

            tx.execute(
                "INSERT INTO extracted_data (cnpj, cep, data_emissao, valor_total) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![fields.cnpj, fields.cep, fields.issue_date, fields.total_value],
            )
            .map_err(|e| DocfieldsError::persistence_with_source(format!("Insert failed: {}", e), e))?;

            let id = tx.last_insert_rowid();
            let created_at: String = tx
                .query_row(
                    "SELECT created_at FROM extracted_data WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(|e| DocfieldsError::persistence_with_source("Failed to read inserted row", e))?;

            tx.commit()
                .map_err(|e| DocfieldsError::persistence_with_source(format!("Commit failed: {}", e), e))?;

            Ok(ExtractedRecord {
                id,
                fields,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .await
    }

    async fn get(&self, id: i64) -> DocfieldsResult<Option<ExtractedRecord>> {
        self.with_conn(move |conn| {
            let found = conn
                .query_row(
                    "SELECT id, cnpj, cep, data_emissao, valor_total, created_at \
                     FROM extracted_data WHERE id = ?1",
                    params![id],
                    read_row,
                )
                .optional()
                .map_err(|e| DocfieldsError::persistence_with_source("Select failed", e))?;

            found
                .map(|(id, fields, raw)| -> DocfieldsResult<ExtractedRecord> {
                    Ok(ExtractedRecord {
                        id,
                        fields,
                        created_at: parse_timestamp(&raw)?,
                    })
                })
                .transpose()
        })
        .await
    }

    async fn count(&self) -> DocfieldsResult<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM extracted_data", [], |row| row.get(0))
                .map_err(|e| DocfieldsError::persistence_with_source("Count failed", e))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn ping(&self) -> DocfieldsResult<i32> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get(0))
                .map_err(|e| DocfieldsError::persistence_with_source("Health query failed", e))
        })
        .await
    }

    fn backend_name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractedFields {
        ExtractedFields {
            cnpj: "12.345.678/0001-90".to_string(),
            cep: "01310-100".to_string(),
            issue_date: "05/03/2024 14:22:10".to_string(),
            total_value: "R$ 150,00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = SqliteRecordStore::in_memory().unwrap();

        let record = store.insert(&sample()).await.unwrap();
        assert_eq!(record.fields, sample());

        let fetched = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.fields, sample());
        assert_eq!(fetched.created_at, record.created_at);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let first = store.insert(&ExtractedFields::default()).await.unwrap();
        let second = store.insert(&ExtractedFields::default()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = SqliteRecordStore::in_memory().unwrap();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overlong_field_rolls_back() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let fields = ExtractedFields {
            cnpj: "1".repeat(CNPJ_MAX_LEN + 1),
            ..sample()
        };

        let err = store.insert(&fields).await.unwrap_err();
        assert!(matches!(err, DocfieldsError::Persistence { .. }));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ping() {
        let store = SqliteRecordStore::in_memory().unwrap();
        assert_eq!(store.ping().await.unwrap(), 1);
        assert_eq!(store.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn test_file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("docfields.db");

        let id = {
            let store = SqliteRecordStore::open(&path).unwrap();
            store.insert(&sample()).await.unwrap().id
        };

        let reopened = SqliteRecordStore::open(&path).unwrap();
        let record = reopened.get(id).await.unwrap().unwrap();
        assert_eq!(record.fields.total_value, "R$ 150,00");
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-03-05 14:22:10").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-05T14:22:10+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
