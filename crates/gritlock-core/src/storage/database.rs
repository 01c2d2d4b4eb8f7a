//! SQLite key-value storage.
//!
//! Holds the small amount of state that must survive a process restart:
//! - whether a session was running
//! - the locally shielded app set
//! - the local screen-time authorization flag

use std::path::Path;

use rusqlite::{params, Connection};

use super::{data_dir, RunningFlagStore};
use crate::error::StorageError;

pub const RUNNING_FLAG_KEY: &str = "session.running";

/// SQLite database with a single `kv` table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/gritlock/gritlock.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Self::open_at(&dir.join("gritlock.db"))
    }

    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Missing keys are fine.
    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Read a boolean stored as `"true"`/`"false"`. Missing keys read as false.
    pub fn kv_get_bool(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.kv_get(key)?.as_deref() == Some("true"))
    }

    pub fn kv_set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.kv_set(key, if value { "true" } else { "false" })
    }
}

impl RunningFlagStore for Database {
    fn running_flag(&self) -> Result<bool, StorageError> {
        self.kv_get_bool(RUNNING_FLAG_KEY)
    }

    fn set_running_flag(&mut self, running: bool) -> Result<(), StorageError> {
        self.kv_set_bool(RUNNING_FLAG_KEY, running)
    }
}
