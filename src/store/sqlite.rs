//! `SQLite` store.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use super::{StoreError, UserRecord, UserStore};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    name TEXT,
    balance INTEGER NOT NULL DEFAULT 0,
    score INTEGER NOT NULL DEFAULT 0,
    case_tokens INTEGER NOT NULL DEFAULT 0,
    last_claim TEXT
);

CREATE TABLE IF NOT EXISTS garage (
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    item TEXT NOT NULL,
    PRIMARY KEY (user_id, item)
);
";

/// Keeps records in two tables: `users` and `garage`.
///
/// A `put` rewrites the user row and its garage rows in one transaction.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;

        let store = Self::with_connection(conn)?;
        info!("Opened SQLite player store at {}", path.display());
        Ok(store)
    }

    /// Opens a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    fn load_garage(&self, user_id: u64) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT item FROM garage WHERE user_id = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map([user_id], |row| row.get::<_, String>(0))?;
        let garage = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(garage)
    }
}

/// Raw `users` row before the timestamp is parsed.
struct UserRow {
    name: Option<String>,
    balance: i64,
    score: u64,
    case_tokens: u32,
    last_claim: Option<String>,
}

impl UserStore for SqliteStore {
    fn get(&self, user_id: u64) -> Result<Option<UserRecord>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT name, balance, score, case_tokens, last_claim FROM users WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(UserRow {
                        name: row.get(0)?,
                        balance: row.get(1)?,
                        score: row.get(2)?,
                        case_tokens: row.get(3)?,
                        last_claim: row.get(4)?,
                    })
                },
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let last_claim = row
            .last_claim
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| StoreError::Corrupt {
                        user_id,
                        reason: format!("bad last_claim '{raw}': {e}"),
                    })
            })
            .transpose()?;

        Ok(Some(UserRecord {
            user_id,
            name: row.name,
            balance: row.balance,
            score: row.score,
            garage: self.load_garage(user_id)?,
            case_tokens: row.case_tokens,
            last_claim,
        }))
    }

    fn put(&mut self, user_id: u64, record: &UserRecord) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO users (user_id, name, balance, score, case_tokens, last_claim)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                balance = excluded.balance,
                score = excluded.score,
                case_tokens = excluded.case_tokens,
                last_claim = excluded.last_claim",
            params![
                user_id,
                record.name,
                record.balance,
                record.score,
                record.case_tokens,
                record.last_claim.map(|dt| dt.to_rfc3339()),
            ],
        )?;

        tx.execute("DELETE FROM garage WHERE user_id = ?1", [user_id])?;
        {
            let mut insert =
                tx.prepare("INSERT OR IGNORE INTO garage (user_id, item) VALUES (?1, ?2)")?;
            for item in &record.garage {
                insert.execute(params![user_id, item])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_missing_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get(10).unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_put_and_get_roundtrip() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut record = UserRecord::new(10);
        record.name = Some("Alex".to_owned());
        record.balance = 1200;
        record.score = 620;
        record.case_tokens = 2;
        record.garage = vec!["BMW M5 F90".to_owned(), "Honda Civic".to_owned()];
        record.last_claim = Some(Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap());

        store.put(10, &record).unwrap();
        assert_eq!(store.get(10).unwrap(), Some(record));
    }

    #[test]
    fn test_put_replaces_garage() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut record = UserRecord::new(3);
        record.garage = vec!["Audi R8".to_owned(), "Ford Focus".to_owned()];
        store.put(3, &record).unwrap();

        record.garage.retain(|item| item != "Audi R8");
        record.garage.push("Bugatti Chiron".to_owned());
        store.put(3, &record).unwrap();

        let loaded = store.get(3).unwrap().unwrap();
        assert_eq!(loaded.garage, vec!["Ford Focus", "Bugatti Chiron"]);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_timestamp() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.put(4, &UserRecord::new(4)).unwrap();
        store
            .conn
            .execute("UPDATE users SET last_claim = 'yesterday' WHERE user_id = 4", [])
            .unwrap();

        assert!(matches!(store.get(4), Err(StoreError::Corrupt { user_id: 4, .. })));
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carcase.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            let mut record = UserRecord::new(8);
            record.score = 20;
            store.put(8, &record).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get(8).unwrap().map(|r| r.score), Some(20));
    }
}
