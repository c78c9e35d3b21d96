//! Session Manager.
//!
//! Writes the persisted subset of the tab store (`tabs` + `active_tab_id`) to a
//! [`KeyValueStore`] and rehydrates it at startup. Restore is lenient: the
//! payload is read as untyped JSON and every malformed entry is dropped
//! individually instead of rejecting the whole session.

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use crate::services::key_value_store::KeyValueStore;
use crate::types::errors::StorageError;
use crate::types::session::{PersistedTabs, RestoredSession};
use crate::types::tab::Tab;

/// Trait defining session persistence operations.
pub trait SessionManagerTrait {
    fn save(&self, data: &PersistedTabs) -> Result<(), StorageError>;
    fn restore(&self) -> RestoredSession;
    fn has_session(&self) -> bool;
}

/// Session manager backed by any [`KeyValueStore`].
pub struct SessionManager {
    store: Box<dyn KeyValueStore>,
    storage_key: String,
    home_url: String,
    default_title: String,
}

impl SessionManager {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        storage_key: &str,
        home_url: &str,
        default_title: &str,
    ) -> Self {
        Self {
            store,
            storage_key: storage_key.to_string(),
            home_url: home_url.to_string(),
            default_title: default_title.to_string(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Builds the single tab used whenever nothing valid can be restored.
    pub fn default_tab(&self) -> Tab {
        Tab::new(Uuid::new_v4().to_string(), &self.home_url, &self.default_title)
    }

    /// Applies the restore validation policy to a raw persisted payload.
    pub fn validate(&self, raw: Option<&Value>) -> RestoredSession {
        let entries = raw
            .and_then(|v| v.get("tabs"))
            .and_then(|v| v.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[]);

        let mut seen = HashSet::new();
        let mut tabs = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.validate_entry(entry) {
                Some(tab) if seen.insert(tab.id.clone()) => tabs.push(tab),
                _ => {}
            }
        }
        let dropped = entries.len() - tabs.len();

        if tabs.is_empty() {
            let tab = self.default_tab();
            let active_tab_id = Some(tab.id.clone());
            return RestoredSession {
                tabs: vec![tab],
                active_tab_id,
                dropped,
            };
        }

        let requested = raw
            .and_then(|v| v.get("active_tab_id"))
            .and_then(|v| v.as_str());
        let active_tab_id = match requested {
            Some(id) if tabs.iter().any(|t| t.id == id) => Some(id.to_string()),
            _ => tabs.first().map(|t| t.id.clone()),
        };

        RestoredSession {
            tabs,
            active_tab_id,
            dropped,
        }
    }

    /// An entry is kept only with a string `id` and a non-empty string `url`.
    fn validate_entry(&self, entry: &Value) -> Option<Tab> {
        let id = entry.get("id")?.as_str()?;
        let url = entry.get("url")?.as_str().filter(|u| !u.is_empty())?;
        let title = entry
            .get("title")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.default_title);

        let mut tab = Tab::new(id, url, title);
        tab.thumbnail = entry
            .get("thumbnail")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        tab.zoom_level = entry
            .get("zoom_level")
            .and_then(|v| v.as_f64())
            .filter(|z| z.is_finite() && *z > 0.0);
        Some(tab)
    }
}

impl SessionManagerTrait for SessionManager {
    fn save(&self, data: &PersistedTabs) -> Result<(), StorageError> {
        let value =
            serde_json::to_value(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(&self.storage_key, &value)
    }

    fn restore(&self) -> RestoredSession {
        let raw = self.store.get(&self.storage_key);
        let restored = self.validate(raw.as_ref());
        if restored.dropped > 0 {
            log::warn!(
                "Dropped {} malformed tab entries while restoring session",
                restored.dropped
            );
        }
        log::info!("Rehydrated with {} valid tabs", restored.tabs.len());
        restored
    }

    fn has_session(&self) -> bool {
        self.store.get(&self.storage_key).is_some()
    }
}
