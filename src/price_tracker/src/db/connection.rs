//! SQLite connection helpers.
//!
//! Provides [`connect_sqlite`] that opens a connection and applies recommended PRAGMAs:
//! WAL journaling, foreign_keys=ON, and a 5000ms busy_timeout. Concurrent check
//! workers each open their own connection and rely on the busy timeout to queue
//! behind one another's write transactions.

use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

use crate::history::{StoreError, StoreResult};

/// Maps a configured locator to the path handed to SQLite.
///
/// Accepts a bare path, `sqlite:<path>` or `sqlite://<path>`. Other schemes
/// (e.g. `postgres://`) are rejected with [`StoreError::UnsupportedBackend`].
///
/// In-memory databases are rejected too: every store operation opens its own
/// connection, and each would see a different empty database.
pub fn sqlite_path(database_url: &str) -> StoreResult<&str> {
    let unsupported = || StoreError::UnsupportedBackend(database_url.to_string());
    let url = database_url.trim();
    let path = if let Some(rest) = url.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = url.strip_prefix("sqlite:") {
        rest
    } else if url.contains("://") {
        return Err(unsupported());
    } else {
        url
    };
    if path.is_empty() || path == ":memory:" || path.contains("mode=memory") {
        return Err(unsupported());
    }
    Ok(path)
}

/// Open a SQLite connection and apply connection-wide PRAGMAs.
pub fn connect_sqlite(database_url: &str) -> StoreResult<SqliteConnection> {
    let mut conn = SqliteConnection::establish(sqlite_path(database_url)?)?;

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    Ok(conn)
}
