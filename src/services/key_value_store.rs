//! Durable key-value storage used to persist the tab store.
//!
//! Values are JSON documents. `get` never fails: an unreadable entry is
//! reported as absent so callers fall back to their defaults.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use serde_json::Value;

use crate::database::migrations;
use crate::types::errors::StorageError;

/// Trait defining the key-value storage interface.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing value, e.g. a payload to restore from.
    pub fn with_entry(key: &str, value: Value) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// SQLite-backed store, one row per key in `kv_store`. Pending schema
/// migrations run when the store is opened.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    fn with_connection(conn: rusqlite::Result<Connection>) -> Result<Self, StorageError> {
        let conn = conn.map_err(|e| StorageError::Database(e.to_string()))?;
        migrations::run_all(&conn).map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory())
    }

    /// Reads the raw text stored under `key`.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let result = self.conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(text) => Ok(Some(text)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Database(e.to_string())),
        }
    }

    /// Writes raw text under `key`, bypassing JSON encoding.
    pub fn set_raw(&self, key: &str, text: &str) -> Result<(), StorageError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, text, now],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<Value> {
        let text = match self.get_raw(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("kv_store read failed for '{}': {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("kv_store entry '{}' is not valid JSON: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let text =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set_raw(key, &text)
    }
}
