//! Shortcut Manager.
//!
//! Maps shell actions to key combinations, detects conflicts and resolves a
//! pressed combination back to its action. Bindings are written with `Ctrl+`
//! and shown as `Cmd+` on macOS.

use std::collections::HashMap;

use crate::types::errors::ShortcutError;
use crate::types::settings::AppSettings;

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, action: &str) -> Option<&str>;
    fn list_shortcuts(&self) -> &HashMap<String, String>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String>;
    fn action_for_keys(&self, keys: &str) -> Option<&str>;
}

pub struct ShortcutManager {
    shortcuts: HashMap<String, String>,
}

impl ShortcutManager {
    /// Starts from the built-in bindings.
    pub fn new() -> Self {
        Self::from_bindings(&AppSettings::default_shortcuts())
    }

    /// Starts from user-configured bindings. Empty key strings are skipped.
    pub fn from_bindings(bindings: &HashMap<String, String>) -> Self {
        let shortcuts = bindings
            .iter()
            .filter(|(_, keys)| !keys.trim().is_empty())
            .map(|(action, keys)| (action.clone(), normalize(keys)))
            .collect();
        Self { shortcuts }
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform spelling of a key combination.
fn normalize(keys: &str) -> String {
    let keys = keys.trim();
    if cfg!(target_os = "macos") {
        keys.replace("Ctrl+", "Cmd+")
    } else {
        keys.to_string()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        if keys.trim().is_empty() {
            return Err(ShortcutError::InvalidKeys("Keys cannot be empty".to_string()));
        }
        if let Some(other) = self.has_conflict(keys, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                keys, other
            )));
        }
        self.shortcuts.insert(action.to_string(), normalize(keys));
        Ok(())
    }

    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError> {
        self.shortcuts
            .remove(action)
            .map(|_| ())
            .ok_or_else(|| ShortcutError::NotFound(action.to_string()))
    }

    fn get_shortcut(&self, action: &str) -> Option<&str> {
        self.shortcuts.get(action).map(String::as_str)
    }

    fn list_shortcuts(&self) -> &HashMap<String, String> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        *self = Self::new();
    }

    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String> {
        let wanted = normalize(keys);
        self.shortcuts
            .iter()
            .find(|(action, bound)| **bound == wanted && Some(action.as_str()) != exclude_action)
            .map(|(action, _)| action.clone())
    }

    fn action_for_keys(&self, keys: &str) -> Option<&str> {
        let wanted = normalize(keys);
        self.shortcuts
            .iter()
            .find(|(_, bound)| **bound == wanted)
            .map(|(action, _)| action.as_str())
    }
}
