//! Repository layer for SQLite persistence.

pub mod watchface;

pub use watchface::{WatchfaceRepository, DEFAULT_BATCH_SIZE, WATCHFACES_TABLE};

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid row {key}: {reason}")]
    InvalidRow { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Open a connection to the database file, creating it if missing.
pub fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Make sure the database file and its directory exist.
pub fn ensure_database_file(db_path: &Path) -> Result<bool> {
    if db_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    drop(connect(db_path)?);
    tracing::info!("Successfully created database file '{}'", db_path.display());
    Ok(true)
}

/// Turn "no rows" into `None`.
pub fn to_option<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_database_file_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("facescrape.db");

        assert!(ensure_database_file(&path).unwrap());
        assert!(path.exists());
        assert!(!ensure_database_file(&path).unwrap());
    }

    #[test]
    fn to_option_maps_no_rows() {
        let dir = TempDir::new().unwrap();
        let conn = connect(&dir.path().join("t.db")).unwrap();
        let none: Option<i64> =
            to_option(conn.query_row("SELECT 1 WHERE 0", [], |row| row.get(0))).unwrap();
        assert!(none.is_none());
    }
}
