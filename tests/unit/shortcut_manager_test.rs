//! Unit tests for the ShortcutManager: defaults, conflicts and key lookup.

use std::collections::HashMap;

use ytdesktop::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use ytdesktop::types::errors::ShortcutError;

fn platform(keys: &str) -> String {
    if cfg!(target_os = "macos") {
        keys.replace("Ctrl+", "Cmd+")
    } else {
        keys.to_string()
    }
}

#[test]
fn test_defaults_cover_shell_actions() {
    let mgr = ShortcutManager::new();
    for action in ["new_tab", "close_tab", "reload", "back", "forward", "zoom_in", "zoom_out"] {
        assert!(mgr.get_shortcut(action).is_some(), "missing default for {}", action);
    }
    assert_eq!(mgr.get_shortcut("new_tab"), Some(platform("Ctrl+T").as_str()));
    assert_eq!(mgr.get_shortcut("back"), Some("Alt+Left"));
}

#[test]
fn test_action_for_keys_resolves_bindings() {
    let mgr = ShortcutManager::new();
    assert_eq!(mgr.action_for_keys("Ctrl+W"), Some("close_tab"));
    assert_eq!(mgr.action_for_keys(" Alt+Right "), Some("forward"));
    assert_eq!(mgr.action_for_keys("Ctrl+Q"), None);
}

#[test]
fn test_register_detects_conflicts() {
    let mut mgr = ShortcutManager::new();
    let err = mgr.register_shortcut("reload", "Ctrl+T").unwrap_err();
    assert!(matches!(err, ShortcutError::Conflict(_)));

    mgr.register_shortcut("reload", "F5").unwrap();
    assert_eq!(mgr.action_for_keys("F5"), Some("reload"));
    assert_eq!(mgr.action_for_keys("Ctrl+R"), None);
}

#[test]
fn test_rebinding_same_action_is_not_a_conflict() {
    let mut mgr = ShortcutManager::new();
    mgr.register_shortcut("new_tab", "Ctrl+T").unwrap();
    assert_eq!(mgr.has_conflict("Ctrl+T", Some("new_tab")), None);
    assert_eq!(mgr.has_conflict("Ctrl+T", None), Some("new_tab".to_string()));
}

#[test]
fn test_empty_keys_are_invalid() {
    let mut mgr = ShortcutManager::new();
    assert!(matches!(
        mgr.register_shortcut("zoom_in", "  "),
        Err(ShortcutError::InvalidKeys(_))
    ));
}

#[test]
fn test_unregister_and_reset() {
    let mut mgr = ShortcutManager::new();
    mgr.unregister_shortcut("zoom_out").unwrap();
    assert!(mgr.get_shortcut("zoom_out").is_none());
    assert!(matches!(
        mgr.unregister_shortcut("zoom_out"),
        Err(ShortcutError::NotFound(_))
    ));

    mgr.reset_to_defaults();
    assert_eq!(mgr.list_shortcuts().len(), 7);
}

#[test]
fn test_from_bindings_skips_empty_keys() {
    let mut bindings = HashMap::new();
    bindings.insert("reload".to_string(), "F5".to_string());
    bindings.insert("back".to_string(), "".to_string());

    let mgr = ShortcutManager::from_bindings(&bindings);
    assert_eq!(mgr.list_shortcuts().len(), 1);
    assert_eq!(mgr.action_for_keys("F5"), Some("reload"));
}
