//! Durable home for persisted workspace snapshots.
//!
//! Snapshots are kept as JSON text in a single-table SQLite key/value store,
//! one row per persistence key (the app uses `"rmbr-workspace"`).

use crate::{PersistedState, Result, RmbrError, Snapshot};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Creates (or reuses) a snapshot store at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Opens an existing snapshot store.
    ///
    /// # Errors
    ///
    /// Returns [`RmbrError::InvalidSnapshot`] if the file is not an rmbr
    /// store, or [`RmbrError::Database`] if SQLite cannot read it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'kv_store'",
            [],
            |row| row.get(0),
        )?;

        if table_count != 1 {
            return Err(RmbrError::InvalidSnapshot(
                "Not a valid rmbr snapshot store".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    /// A throwaway store that lives only as long as this value.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Writes `snapshot` under `key`, replacing any previous value.
    pub fn save_snapshot(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        let json = PersistedState::new(snapshot.clone()).to_json()?;
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, saved_at = excluded.saved_at",
            rusqlite::params![key, json, now],
        )?;
        Ok(())
    }

    /// Reads the snapshot stored under `key`, or `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns [`RmbrError::Json`] or [`RmbrError::UnsupportedSnapshotVersion`]
    /// if the stored value does not match the current schema.
    pub fn load_snapshot(&self, key: &str) -> Result<Option<Snapshot>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(PersistedState::from_json(&json)?.state)),
            None => Ok(None),
        }
    }

    /// Deletes the value under `key`. Returns `true` if a row was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }
}
