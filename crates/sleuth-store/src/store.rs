//! Store capability traits and the SQLite implementation
//!
//! # Usage
//!
//! ```no_run
//! use sleuth_store::{QueryExecutor, QueryValidator, SqliteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("sql-murder-mystery.db")?;
//! store.validate("SELECT * FROM person LIMIT 5").await?;
//! let rows = store.execute("SELECT * FROM person LIMIT 5").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::policy::check_statement;
use crate::row::Row;
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row as _, TypeInfo, ValueRef};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Plan-only structural check of a statement
#[async_trait]
pub trait QueryValidator: Send + Sync {
    /// Confirm `statement` would run against the schema without running it.
    ///
    /// Returns the normalized text the executor will actually run, or
    /// `Error::Structural` when the statement is refused.
    async fn validate(&self, statement: &str) -> Result<String>;
}

/// Runs a read-only statement
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `statement` and return its rows in result order
    async fn execute(&self, statement: &str) -> Result<Vec<Row>>;
}

/// Both store capabilities behind one object
pub trait DataStore: QueryValidator + QueryExecutor {}

impl<T: QueryValidator + QueryExecutor> DataStore for T {}

/// Default cap on rows fetched by one `execute`
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// SQLite store opening a read-only connection per call
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    options: SqliteConnectOptions,
    max_rows: usize,
}

impl SqliteStore {
    /// Create a store for an existing database file.
    ///
    /// No connection is held; this only checks that the file exists.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Connection(format!(
                "database file not found: {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        Ok(Self {
            path: path.to_path_buf(),
            options,
            max_rows: DEFAULT_MAX_ROWS,
        })
    }

    /// Stop fetching after `max_rows` rows; the rest of the result is dropped.
    ///
    /// A cap of 0 is raised to 1.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    /// Row cap applied by `execute`
    #[must_use]
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Database file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        SqliteConnection::connect_with(&self.options)
            .await
            .map_err(|e| Error::Connection(format!("failed to open {}: {}", self.path.display(), e)))
    }

    async fn close(conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close SQLite connection");
        }
    }
}

#[async_trait]
impl QueryValidator for SqliteStore {
    #[instrument(skip(self, statement))]
    async fn validate(&self, statement: &str) -> Result<String> {
        let statement = check_statement(statement)?;
        let mut conn = self.connect().await?;

        // EXPLAIN compiles the statement to a program without stepping it
        let outcome = sqlx::query(&format!("EXPLAIN {}", statement))
            .fetch_all(&mut conn)
            .await;
        Self::close(conn).await;

        match outcome {
            Ok(_) => {
                debug!(statement = %statement, "Statement validated");
                Ok(statement)
            }
            Err(sqlx::Error::Database(db_err)) => Err(Error::structural(db_err.message())),
            Err(e) => Err(Error::Connection(e.to_string())),
        }
    }
}

#[async_trait]
impl QueryExecutor for SqliteStore {
    #[instrument(skip(self, statement))]
    async fn execute(&self, statement: &str) -> Result<Vec<Row>> {
        let statement = check_statement(statement)?;
        let mut conn = self.connect().await?;

        let outcome = fetch_capped(&mut conn, &statement, self.max_rows).await;
        Self::close(conn).await;

        let rows = match outcome {
            Ok((rows, truncated)) => {
                if truncated {
                    warn!(
                        statement = %statement,
                        max_rows = self.max_rows,
                        "Result truncated at row cap"
                    );
                }
                rows
            }
            Err(sqlx::Error::Database(db_err)) => {
                return Err(Error::Execution(db_err.message().to_string()))
            }
            Err(e) => return Err(Error::Connection(e.to_string())),
        };

        let decoded = rows
            .iter()
            .map(decode_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Execution(format!("failed to decode row: {}", e)))?;

        debug!(statement = %statement, rows = decoded.len(), "Statement executed");
        Ok(decoded)
    }
}

/// Pull rows off the cursor until the cap; `true` when more rows were left unread.
async fn fetch_capped(
    conn: &mut SqliteConnection,
    statement: &str,
    max_rows: usize,
) -> std::result::Result<(Vec<SqliteRow>, bool), sqlx::Error> {
    let mut stream = sqlx::query(statement).fetch(conn);
    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        if rows.len() == max_rows {
            return Ok((rows, true));
        }
        rows.push(row);
    }
    Ok((rows, false))
}

fn decode_row(row: &SqliteRow) -> std::result::Result<Row, sqlx::Error> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let value = decode_value(row, column.ordinal())?;
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

/// Decode by the value's storage class; SQLite column affinity is advisory.
fn decode_value(row: &SqliteRow, index: usize) -> std::result::Result<Value, sqlx::Error> {
    let storage_class = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" | "NUMERIC" => serde_json::Number::from_f64(row.try_get::<f64, _>(index)?)
            .map_or(Value::Null, Value::Number),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            Value::String(format!("<blob: {} bytes>", bytes.len()))
        }
        _ => Value::String(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}
