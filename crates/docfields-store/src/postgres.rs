//! PostgreSQL record store using deadpool connection pooling.
//!
//! The pool is built once at startup. [`PostgresRecordStore::connect`]
//! retries the first connection at a constant interval, except for
//! failures that retrying cannot fix (unknown database, bad credentials,
//! missing privileges), which fail immediately with a hint.
//!
//! # Example
//!
//! ```ignore
//! use docfields_core::config::{ConnectRetryConfig, PostgresConfig};
//! use docfields_store::PostgresRecordStore;
//!
//! let store = PostgresRecordStore::connect(&PostgresConfig::default(), ConnectRetryConfig::default()).await?;
//! ```

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::FromSql;
use tokio_postgres::{NoTls, Row};
use tracing::{info, warn};

use docfields_core::config::{ConnectRetryConfig, PostgresConfig};
use docfields_core::error::{DocfieldsError, DocfieldsResult};
use docfields_core::traits::RecordStore;
use docfields_core::types::{ExtractedFields, ExtractedRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS extracted_data (
    id           BIGSERIAL PRIMARY KEY,
    cnpj         VARCHAR(18) NOT NULL DEFAULT '',
    cep          VARCHAR(9)  NOT NULL DEFAULT '',
    data_emissao VARCHAR(19) NOT NULL DEFAULT '',
    valor_total  VARCHAR(50) NOT NULL DEFAULT '',
    created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
);
ALTER TABLE extracted_data ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT now();
"#;

const INSERT_SQL: &str = "INSERT INTO extracted_data (cnpj, cep, data_emissao, valor_total) \
     VALUES ($1, $2, $3, $4) RETURNING id::BIGINT, created_at::TIMESTAMPTZ";

const SELECT_SQL: &str = "SELECT id::BIGINT, cnpj, cep, data_emissao, valor_total, \
     created_at::TIMESTAMPTZ FROM extracted_data WHERE id = $1";

const POOL_WAIT_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL-backed [`RecordStore`].
pub struct PostgresRecordStore {
    pool: Pool,
    max_size: usize,
}

/// Failure of a single connection attempt.
#[derive(Debug)]
struct ConnectFailure {
    message: String,
    state: Option<SqlState>,
}

impl ConnectFailure {
    fn from_pool(err: PoolError) -> Self {
        let state = match &err {
            PoolError::Backend(e) => e.code().cloned(),
            _ => None,
        };
        Self {
            message: err.to_string(),
            state,
        }
    }

    fn from_query(err: tokio_postgres::Error) -> Self {
        Self {
            state: err.code().cloned(),
            message: err.to_string(),
        }
    }

    /// Hint for failures that retrying cannot fix.
    fn permanent_hint(&self, config: &PostgresConfig) -> Option<String> {
        let state = self.state.as_ref()?;
        if *state == SqlState::INVALID_CATALOG_NAME {
            Some(format!(
                "database '{}' does not exist; create it with: CREATE DATABASE {};",
                config.dbname, config.dbname
            ))
        } else if *state == SqlState::INVALID_PASSWORD
            || *state == SqlState::INVALID_AUTHORIZATION_SPECIFICATION
        {
            Some(format!(
                "authentication failed for user '{}'; check DB_USER and DB_PASS",
                config.user
            ))
        } else if *state == SqlState::INSUFFICIENT_PRIVILEGE {
            Some(format!(
                "user '{}' lacks privileges on database '{}'; grant them with: \
                 GRANT ALL PRIVILEGES ON DATABASE {} TO {};",
                config.user, config.dbname, config.dbname, config.user
            ))
        } else {
            None
        }
    }
}

impl std::fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Read a column, reporting a type mismatch as a persistence error.
fn column<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> DocfieldsResult<T> {
    row.try_get(idx).map_err(|e| {
        DocfieldsError::persistence_with_source(format!("Failed to read column {}: {}", idx, e), e)
    })
}

impl PostgresRecordStore {
    /// Build the pool, connect with retry and create the schema if absent.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if:
    /// - `DATABASE_URL` cannot be parsed
    /// - Pool creation fails
    /// - A permanent failure occurs on any attempt
    /// - Every attempt fails
    pub async fn connect(
        config: &PostgresConfig,
        retry: ConnectRetryConfig,
    ) -> DocfieldsResult<Self> {
        let pg_config = Self::pg_config(config)?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg_config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.pool_max_size)
            .wait_timeout(Some(Duration::from_secs(POOL_WAIT_TIMEOUT_SECS)))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| {
                DocfieldsError::db_connection(format!("Failed to create connection pool: {}", e))
            })?;

        let target = config.redacted_url();
        info!(target = %target, max_attempts = retry.max_attempts, "Connecting to PostgreSQL");

        let attempt = || async {
            let client = pool.get().await.map_err(ConnectFailure::from_pool)?;
            client
                .batch_execute(SCHEMA)
                .await
                .map_err(ConnectFailure::from_query)
        };

        attempt
            .retry(
                ConstantBuilder::default()
                    .with_delay(Duration::from_secs(retry.delay_secs))
                    .with_max_times(retry.max_attempts.saturating_sub(1)),
            )
            .when(|e| e.permanent_hint(config).is_none())
            .notify(|err, dur| {
                warn!(
                    "Connection to {} failed, retrying in {:?}: {}",
                    target, dur, err
                );
            })
            .await
            .map_err(|e| match e.permanent_hint(config) {
                Some(hint) => DocfieldsError::db_connection(format!("{} ({})", e, hint)),
                None => DocfieldsError::db_connection(format!(
                    "Could not connect to {} after {} attempt(s): {}",
                    target, retry.max_attempts, e
                )),
            })?;

        info!("PostgreSQL store ready");

        Ok(Self {
            pool,
            max_size: config.pool_max_size,
        })
    }

    fn pg_config(config: &PostgresConfig) -> DocfieldsResult<tokio_postgres::Config> {
        if let Some(url) = &config.url {
            return tokio_postgres::Config::from_str(url.expose_secret()).map_err(|e| {
                DocfieldsError::Configuration(format!("Invalid PostgreSQL connection URL: {}", e))
            });
        }

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .dbname(&config.dbname)
            .user(&config.user)
            .password(config.password.expose_secret());
        Ok(pg_config)
    }

    /// Get a client from the connection pool.
    async fn get_client(&self) -> DocfieldsResult<deadpool_postgres::Client> {
        self.pool.get().await.map_err(|e| {
            let msg = if matches!(e, PoolError::Timeout(_)) {
                format!(
                    "Connection pool exhausted (timeout waiting for connection). \
                     Consider increasing DB_POOL_MAX_SIZE (currently: {}).",
                    self.max_size
                )
            } else {
                "Failed to get connection from pool".to_string()
            };
            DocfieldsError::persistence_with_source(msg, e)
        })
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, fields: &ExtractedFields) -> DocfieldsResult<ExtractedRecord> {
        let mut client = self.get_client().await?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| DocfieldsError::persistence_with_source("Failed to begin transaction", e))?;

        let row = match tx
            .query_one(
                INSERT_SQL,
                &[
                    &fields.cnpj,
                    &fields.cep,
                    &fields.issue_date,
                    &fields.total_value,
                ],
            )
            .await
        {
            Ok(row) => row,
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback after failed insert also failed: {}", rollback);
                }
                return Err(DocfieldsError::persistence_with_source(
                    format!("Insert failed: {}", e),
                    e,
                ));
            }
        };

        let record = match column(&row, 0).and_then(|id| Ok((id, column(&row, 1)?))) {
            Ok((id, created_at)) => ExtractedRecord {
                id,
                fields: fields.clone(),
                created_at,
            },
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback after unreadable insert result also failed: {}", rollback);
                }
                return Err(e);
            }
        };

        tx.commit()
            .await
            .map_err(|e| DocfieldsError::persistence_with_source(format!("Commit failed: {}", e), e))?;

        Ok(record)
    }

    async fn get(&self, id: i64) -> DocfieldsResult<Option<ExtractedRecord>> {
        let client = self.get_client().await?;
        let row = client
            .query_opt(SELECT_SQL, &[&id])
            .await
            .map_err(|e| DocfieldsError::persistence_with_source("Select failed", e))?;

        row.map(|row| {
            Ok(ExtractedRecord {
                id: column(&row, 0)?,
                fields: ExtractedFields {
                    cnpj: column(&row, 1)?,
                    cep: column(&row, 2)?,
                    issue_date: column(&row, 3)?,
                    total_value: column(&row, 4)?,
                },
                created_at: column(&row, 5)?,
            })
        })
        .transpose()
    }

    async fn count(&self) -> DocfieldsResult<u64> {
        let client = self.get_client().await?;
        let row = client
            .query_one("SELECT COUNT(*) FROM extracted_data", &[])
            .await
            .map_err(|e| DocfieldsError::persistence_with_source("Count failed", e))?;
        let count: i64 = column(&row, 0)?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> DocfieldsResult<i32> {
        let client = self.get_client().await?;
        let row = client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| DocfieldsError::persistence_with_source("Health query failed", e))?;
        column(&row, 0)
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}
