use serde::{Deserialize, Serialize};

/// Placeholder URL loaded by a fresh tab.
pub const DEFAULT_URL: &str = "https://www.youtube.com";

/// Placeholder title shown until a better one is resolved.
pub const DEFAULT_TITLE: &str = "YouTube";

/// Sentinel URL/title reported by an empty content surface.
pub const BLANK_URL: &str = "about:blank";

/// One browsing session slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub zoom_level: Option<f64>,
}

impl Tab {
    /// Builds a tab that is not loading and has no zoom override.
    pub fn new(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            is_loading: false,
            thumbnail: None,
            zoom_level: None,
        }
    }

    /// Shallow-merges the fields present in `patch`.
    pub fn apply(&mut self, patch: &TabPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(is_loading) = patch.is_loading {
            self.is_loading = is_loading;
        }
        if let Some(thumbnail) = &patch.thumbnail {
            self.thumbnail = thumbnail.clone();
        }
        if let Some(zoom_level) = patch.zoom_level {
            self.zoom_level = Some(zoom_level);
        }
    }
}

/// Partial update for a [`Tab`]. `None` leaves a field untouched.
///
/// `thumbnail` is doubly optional: `Some(None)` clears the thumbnail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub is_loading: Option<bool>,
    pub thumbnail: Option<Option<String>>,
    pub zoom_level: Option<f64>,
}

/// Navigation capabilities of whichever tab is currently active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ActiveTabState {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_loading: bool,
}

impl ActiveTabState {
    /// Snapshot for a tab that has just been created and starts loading.
    pub fn fresh_loading() -> Self {
        Self {
            can_go_back: false,
            can_go_forward: false,
            is_loading: true,
        }
    }

    pub fn apply(&mut self, patch: &ActiveTabPatch) {
        if let Some(v) = patch.can_go_back {
            self.can_go_back = v;
        }
        if let Some(v) = patch.can_go_forward {
            self.can_go_forward = v;
        }
        if let Some(v) = patch.is_loading {
            self.is_loading = v;
        }
    }
}

/// Partial update for [`ActiveTabState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveTabPatch {
    pub can_go_back: Option<bool>,
    pub can_go_forward: Option<bool>,
    pub is_loading: Option<bool>,
}

impl ActiveTabPatch {
    /// A full snapshot expressed as a patch.
    pub fn snapshot(can_go_back: bool, can_go_forward: bool, is_loading: bool) -> Self {
        Self {
            can_go_back: Some(can_go_back),
            can_go_forward: Some(can_go_forward),
            is_loading: Some(is_loading),
        }
    }

    pub fn loading(is_loading: bool) -> Self {
        Self {
            is_loading: Some(is_loading),
            ..Self::default()
        }
    }
}
