//! # SQLite database methods
//!
//! "Low-level" SQLite interactions, kept as plain functions that accept a `&mut SqliteConnection`
//! rather than stateful structs. Callers obtain a connection from a pool, or open a transaction
//! and pass `&mut *tx`, without any other changes. Atomicity decisions live with the caller.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod orders;
mod rows;
pub mod tracking;

const SQLITE_DB_URL: &str = "sqlite://data/orders.db";

pub fn db_url() -> String {
    let result = env::var("REC_DATABASE_URL").unwrap_or_else(|_| {
        info!("REC_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    // WAL plus a busy timeout keeps short racing write transactions queueing instead of erroring.
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
