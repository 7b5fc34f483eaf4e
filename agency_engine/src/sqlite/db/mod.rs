//! # SQLite Database methods
//!
//! Low-level SQLite interactions, one module per collection.
//!
//! These are plain functions that accept a `&mut SqliteConnection`. Callers can pass a pooled connection, or
//! `&mut *tx` to run several of them inside one transaction.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod contacts;
pub mod credentials;
pub mod transactions;

/// Where the store lives when `AGENCY_DATABASE_URL` is not set. Relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://agency_store.db";

/// The database URL from `AGENCY_DATABASE_URL`, or [`DEFAULT_DATABASE_URL`].
pub fn db_url() -> String {
    let result = env::var("AGENCY_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ AGENCY_DATABASE_URL is not set. Using the default.");
        DEFAULT_DATABASE_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file on first use. The parent directory must already exist.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Wraps a parse failure on a text column so that it surfaces as a decode error on that column.
pub(crate) fn column_error<E>(column: &str, e: E) -> SqlxError
where E: std::error::Error + Send + Sync + 'static {
    SqlxError::ColumnDecode { index: column.to_string(), source: Box::new(e) }
}
