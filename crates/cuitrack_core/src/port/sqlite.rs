//! SQLite-backed persistence port.
//!
//! # Responsibility
//! - Implement the key/value port over the `state_entries` table.
//!
//! # Invariants
//! - Connections must be opened through `db::open_db*` so migrations and
//!   pragmas are applied; `try_new` rejects connections that were not.
//! - Writes are single-statement upserts; no partial write is observable.

use super::{PersistencePort, PortResult, StorageError};
use rusqlite::{params, Connection, OptionalExtension};

const STATE_TABLE: &str = "state_entries";

/// Key/value port over a bootstrapped SQLite connection.
#[derive(Debug)]
pub struct SqlitePort<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePort<'conn> {
    /// Wraps a connection after verifying the backing table exists.
    pub fn try_new(conn: &'conn Connection) -> PortResult<Self> {
        let table: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                params![STATE_TABLE],
                |row| row.get(0),
            )
            .optional()?;
        if table.is_none() {
            return Err(StorageError::MissingTable(STATE_TABLE));
        }
        Ok(Self { conn })
    }
}

impl PersistencePort for SqlitePort<'_> {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM state_entries WHERE key = ?1;",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.conn.execute(
            "INSERT INTO state_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
