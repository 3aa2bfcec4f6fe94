//! Player storage.
//!
//! The game reads a [`UserRecord`] before every decision and writes it back
//! after every mutation. Where the records live is decided at startup by
//! picking one of the [`UserStore`] backends.

mod json;
mod memory;
mod record;
mod sqlite;

use std::path::Path;

use thiserror::Error;

use crate::config::StoreBackend;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use record::UserRecord;
pub use sqlite::SqliteStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize player data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record for user {user_id}: {reason}")]
    Corrupt { user_id: u64, reason: String },

    #[error("Store backend {0} needs a file path")]
    MissingPath(StoreBackend),
}

/// Key-value access to player records.
pub trait UserStore: Send {
    /// Fetches a record, `None` if the player has never been seen.
    fn get(&self, user_id: u64) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts or replaces a record as a single atomic write.
    fn put(&mut self, user_id: u64, record: &UserRecord) -> Result<(), StoreError>;

    /// Number of stored players.
    fn len(&self) -> Result<usize, StoreError>;

    /// Checks if no players are stored.
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Opens the configured backend.
///
/// # Errors
///
/// Returns an error if the backing file cannot be opened or parsed.
pub fn open_store(
    backend: StoreBackend,
    path: Option<&Path>,
) -> Result<Box<dyn UserStore>, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
        StoreBackend::Json => {
            let path = path.ok_or(StoreError::MissingPath(backend))?;
            Ok(Box::new(JsonFileStore::open(path)?))
        }
        StoreBackend::Sqlite => {
            let path = path.ok_or(StoreError::MissingPath(backend))?;
            Ok(Box::new(SqliteStore::open(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory_store() {
        let store = open_store(StoreBackend::Memory, None).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_file_backends_need_path() {
        assert!(matches!(
            open_store(StoreBackend::Json, None),
            Err(StoreError::MissingPath(StoreBackend::Json))
        ));
        assert!(matches!(
            open_store(StoreBackend::Sqlite, None),
            Err(StoreError::MissingPath(StoreBackend::Sqlite))
        ));
    }

    #[test]
    fn test_open_sqlite_store_by_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.db");

        let mut store = open_store(StoreBackend::Sqlite, Some(&path)).unwrap();
        store.put(5, &UserRecord::new(5)).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }
}
