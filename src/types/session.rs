use serde::{Deserialize, Serialize};

use super::tab::Tab;

/// The persisted subset of the store: tabs without transient fields plus the
/// active pointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PersistedTabs {
    pub tabs: Vec<PersistedTab>,
    pub active_tab_id: Option<String>,
}

/// A tab's state as written to durable storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedTab {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<f64>,
}

impl From<&Tab> for PersistedTab {
    fn from(tab: &Tab) -> Self {
        Self {
            id: tab.id.clone(),
            title: tab.title.clone(),
            url: tab.url.clone(),
            thumbnail: tab.thumbnail.clone(),
            zoom_level: tab.zoom_level,
        }
    }
}

impl From<PersistedTab> for Tab {
    fn from(p: PersistedTab) -> Self {
        Self {
            id: p.id,
            title: p.title,
            url: p.url,
            is_loading: false,
            thumbnail: p.thumbnail,
            zoom_level: p.zoom_level,
        }
    }
}

/// Result of rehydrating the store at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<String>,
    /// Number of persisted entries discarded by validation.
    pub dropped: usize,
}
