//! Persistence port contract and in-memory backend.
//!
//! # Responsibility
//! - Define the string-keyed get/set store the assessment store writes
//!   through. The engine treats the port as injected, never owned.
//!
//! # Invariants
//! - `set` either fully succeeds or fully fails; callers never observe a
//!   partial write.
//! - The engine is single-threaded by design; ports may use interior
//!   mutability without locking.

use crate::db::DbError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqlitePort;

pub type PortResult<T> = Result<T, StorageError>;

/// Resource-level persistence failures. Always surfaced to the caller for
/// user-visible handling; in-memory state is kept intact.
#[derive(Debug)]
pub enum StorageError {
    /// Backend capacity would be exceeded by this write.
    QuotaExceeded {
        key: String,
        attempted_bytes: usize,
        capacity_bytes: usize,
    },
    /// Required backing table is missing; the connection was not opened
    /// through the bootstrap path.
    MissingTable(&'static str),
    Db(DbError),
    /// Catch-all for externally supplied port implementations.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                key,
                attempted_bytes,
                capacity_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {attempted_bytes} bytes against capacity {capacity_bytes}"
            ),
            Self::MissingTable(table) => {
                write!(f, "persistence schema missing required table `{table}`")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed get/set store consumed by the assessment store.
pub trait PersistencePort {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
}

/// Map-backed port with an optional byte capacity.
///
/// The capacity models quota-limited backends (the original deployment
/// target persisted into a browser-style bounded store) and lets tests
/// exercise the quota-exceeded recovery path deterministically.
#[derive(Debug, Default)]
pub struct MemoryPort {
    entries: RefCell<BTreeMap<String, String>>,
    capacity_bytes: Option<usize>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Port that rejects writes once total stored bytes would exceed
    /// `capacity_bytes`.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    /// Number of stored keys. Diagnostic accessor.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PersistencePort for MemoryPort {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        if let Some(capacity) = self.capacity_bytes {
            let stored_elsewhere: usize = self
                .entries
                .borrow()
                .iter()
                .filter(|(stored_key, _)| stored_key.as_str() != key)
                .map(|(stored_key, stored_value)| stored_key.len() + stored_value.len())
                .sum();
            let attempted = stored_elsewhere + key.len() + value.len();
            if attempted > capacity {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    attempted_bytes: attempted,
                    capacity_bytes: capacity,
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
