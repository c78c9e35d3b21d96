use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tab::{DEFAULT_TITLE, DEFAULT_URL};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    pub general: GeneralSettings,
    pub navigation: NavigationSettings,
    pub oembed: OEmbedSettings,
    pub routing: RoutingSettings,
    #[serde(default = "AppSettings::default_shortcuts")]
    pub shortcuts: HashMap<String, String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            navigation: NavigationSettings::default(),
            oembed: OEmbedSettings::default(),
            routing: RoutingSettings::default(),
            shortcuts: Self::default_shortcuts(),
        }
    }
}

impl AppSettings {
    /// Returns the default keyboard shortcuts, keyed by action.
    pub fn default_shortcuts() -> HashMap<String, String> {
        let mut shortcuts = HashMap::new();
        shortcuts.insert("new_tab".to_string(), "Ctrl+T".to_string());
        shortcuts.insert("close_tab".to_string(), "Ctrl+W".to_string());
        shortcuts.insert("reload".to_string(), "Ctrl+R".to_string());
        shortcuts.insert("back".to_string(), "Alt+Left".to_string());
        shortcuts.insert("forward".to_string(), "Alt+Right".to_string());
        shortcuts.insert("zoom_in".to_string(), "Ctrl+Plus".to_string());
        shortcuts.insert("zoom_out".to_string(), "Ctrl+Minus".to_string());
        shortcuts
    }
}

/// Defaults for freshly created tabs and the persisted store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub home_url: String,
    pub default_title: String,
    pub storage_key: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_URL.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
            storage_key: "yt-app-storage".to_string(),
        }
    }
}

/// Smallest zoom factor the shell ever applies.
pub const MIN_ZOOM_FLOOR: f64 = 0.25;

/// Zoom stepping and the polling backstop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationSettings {
    pub zoom_step: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub poll_interval_ms: u64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            zoom_step: 0.1,
            zoom_min: 0.25,
            zoom_max: 3.0,
            poll_interval_ms: 1000,
        }
    }
}

impl NavigationSettings {
    /// Checks the zoom bounds: `MIN_ZOOM_FLOOR <= zoom_min <= zoom_max`, a
    /// finite `zoom_max` and a positive, finite `zoom_step`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            return Err(format!("zoom_step must be positive, got {}", self.zoom_step));
        }
        if !self.zoom_min.is_finite() || self.zoom_min < MIN_ZOOM_FLOOR {
            return Err(format!(
                "zoom_min must be at least {}, got {}",
                MIN_ZOOM_FLOOR, self.zoom_min
            ));
        }
        if !self.zoom_max.is_finite() || self.zoom_max < self.zoom_min {
            return Err(format!(
                "zoom_max must be finite and not below zoom_min ({}), got {}",
                self.zoom_min, self.zoom_max
            ));
        }
        Ok(())
    }
}

/// Remote metadata lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OEmbedSettings {
    pub endpoint: String,
    pub watch_url_base: String,
    pub timeout_secs: u64,
}

impl Default for OEmbedSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://www.youtube.com/oembed".to_string(),
            watch_url_base: "https://www.youtube.com/watch?v=".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Inbound open-in-new-tab routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingSettings {
    pub open_debounce_ms: u64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            open_debounce_ms: 500,
        }
    }
}
