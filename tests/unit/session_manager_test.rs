//! Unit tests for session restore validation and persistence.

use rstest::rstest;
use serde_json::{json, Value};

use ytdesktop::managers::session_manager::{SessionManager, SessionManagerTrait};
use ytdesktop::services::key_value_store::{KeyValueStore, MemoryStore};
use ytdesktop::types::session::{PersistedTab, PersistedTabs};
use ytdesktop::types::tab::{DEFAULT_TITLE, DEFAULT_URL};

const KEY: &str = "yt-app-storage";

fn manager_with(payload: Option<Value>) -> SessionManager {
    let store = match payload {
        Some(v) => MemoryStore::with_entry(KEY, v),
        None => MemoryStore::new(),
    };
    SessionManager::new(Box::new(store), KEY, DEFAULT_URL, DEFAULT_TITLE)
}

#[test]
fn test_nothing_stored_restores_single_default_tab() {
    let manager = manager_with(None);
    assert!(!manager.has_session());

    let restored = manager.restore();
    assert_eq!(restored.tabs.len(), 1);
    assert_eq!(restored.tabs[0].url, DEFAULT_URL);
    assert_eq!(restored.tabs[0].title, DEFAULT_TITLE);
    assert_eq!(restored.active_tab_id.as_deref(), Some(restored.tabs[0].id.as_str()));
    assert_eq!(restored.dropped, 0);
}

#[test]
fn test_valid_payload_restores_in_order() {
    let manager = manager_with(Some(json!({
        "tabs": [
            {"id": "a", "title": "A", "url": "https://www.youtube.com/a", "zoom_level": 1.5},
            {"id": "b", "title": "B", "url": "https://www.youtube.com/b", "thumbnail": "b.jpg"}
        ],
        "active_tab_id": "b"
    })));

    let restored = manager.restore();
    let ids: Vec<&str> = restored.tabs.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(restored.active_tab_id.as_deref(), Some("b"));
    assert_eq!(restored.tabs[0].zoom_level, Some(1.5));
    assert_eq!(restored.tabs[1].thumbnail.as_deref(), Some("b.jpg"));
    assert!(restored.tabs.iter().all(|t| !t.is_loading));
}

#[rstest]
#[case::missing_id(json!({"title": "x", "url": "https://a.test"}))]
#[case::numeric_id(json!({"id": 7, "title": "x", "url": "https://a.test"}))]
#[case::missing_url(json!({"id": "x", "title": "x"}))]
#[case::empty_url(json!({"id": "x", "title": "x", "url": ""}))]
#[case::not_an_object(json!("tab"))]
fn test_invalid_entries_are_dropped(#[case] bad: Value) {
    let manager = manager_with(Some(json!({
        "tabs": [bad, {"id": "ok", "title": "Ok", "url": "https://a.test"}],
        "active_tab_id": "ok"
    })));
    let restored = manager.restore();
    assert_eq!(restored.tabs.len(), 1);
    assert_eq!(restored.tabs[0].id, "ok");
    assert_eq!(restored.dropped, 1);
}

#[rstest]
#[case::absent(json!({"tabs": [{"id": "a", "url": "https://a.test"}, {"id": "b", "url": "https://b.test"}]}))]
#[case::unknown(json!({"tabs": [{"id": "a", "url": "https://a.test"}, {"id": "b", "url": "https://b.test"}], "active_tab_id": "zzz"}))]
#[case::null(json!({"tabs": [{"id": "a", "url": "https://a.test"}, {"id": "b", "url": "https://b.test"}], "active_tab_id": null}))]
fn test_bad_active_id_falls_back_to_first(#[case] payload: Value) {
    let restored = manager_with(Some(payload)).restore();
    assert_eq!(restored.active_tab_id.as_deref(), Some("a"));
}

#[rstest]
#[case::not_an_object(json!(42))]
#[case::tabs_not_array(json!({"tabs": "nope"}))]
#[case::all_invalid(json!({"tabs": [{"id": 1}, {"url": "x"}]}))]
fn test_unusable_payload_yields_default_tab(#[case] payload: Value) {
    let restored = manager_with(Some(payload)).restore();
    assert_eq!(restored.tabs.len(), 1);
    assert_eq!(restored.tabs[0].url, DEFAULT_URL);
    assert_eq!(restored.active_tab_id.as_deref(), Some(restored.tabs[0].id.as_str()));
}

#[test]
fn test_missing_title_and_bad_zoom_get_defaults() {
    let restored = manager_with(Some(json!({
        "tabs": [{"id": "a", "url": "https://a.test", "title": "", "zoom_level": -2.0}]
    })))
    .restore();
    assert_eq!(restored.tabs[0].title, DEFAULT_TITLE);
    assert_eq!(restored.tabs[0].zoom_level, None);
}

#[test]
fn test_duplicate_ids_keep_first_occurrence() {
    let restored = manager_with(Some(json!({
        "tabs": [
            {"id": "a", "title": "first", "url": "https://a.test"},
            {"id": "a", "title": "second", "url": "https://b.test"}
        ]
    })))
    .restore();
    assert_eq!(restored.tabs.len(), 1);
    assert_eq!(restored.tabs[0].title, "first");
    assert_eq!(restored.dropped, 1);
}

#[test]
fn test_save_writes_under_storage_key() {
    let manager = manager_with(None);
    let data = PersistedTabs {
        tabs: vec![PersistedTab {
            id: "a".to_string(),
            title: "A".to_string(),
            url: "https://a.test".to_string(),
            thumbnail: None,
            zoom_level: None,
        }],
        active_tab_id: Some("a".to_string()),
    };
    manager.save(&data).unwrap();
    assert!(manager.has_session());
    assert_eq!(manager.storage_key(), KEY);

    let restored = manager.restore();
    assert_eq!(restored.tabs[0].id, "a");
    assert_eq!(restored.active_tab_id.as_deref(), Some("a"));
}

#[test]
fn test_saved_shape_omits_transient_fields() {
    let store = MemoryStore::new();
    let data = PersistedTabs {
        tabs: vec![PersistedTab {
            id: "a".to_string(),
            title: "A".to_string(),
            url: "https://a.test".to_string(),
            thumbnail: None,
            zoom_level: Some(2.0),
        }],
        active_tab_id: None,
    };
    store.set(KEY, &serde_json::to_value(&data).unwrap()).unwrap();
    assert_eq!(
        store.get(KEY),
        Some(json!({
            "tabs": [{"id": "a", "title": "A", "url": "https://a.test", "zoom_level": 2.0}],
            "active_tab_id": null
        }))
    );
}
