//! Sleuth Store - read-only SQL capability
//!
//! Two entry points are kept deliberately separate:
//! - [`QueryValidator`]: plan-only structural check, never touches row data
//! - [`QueryExecutor`]: runs a read-only statement and returns ordered rows
//!
//! [`SqliteStore`] implements both on top of `sqlx`, opening a fresh
//! read-only connection for every call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod policy;
pub mod row;
pub mod store;

pub use error::{Error, Result};
pub use policy::{check_statement, PolicyViolation};
pub use row::Row;
pub use store::{DataStore, QueryExecutor, QueryValidator, SqliteStore, DEFAULT_MAX_ROWS};
