//! Unit tests for the schema migrations and the SQLite key-value store on top of them.

use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

use ytdesktop::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use ytdesktop::services::key_value_store::{KeyValueStore, SqliteStore};

#[test]
fn test_migrations_create_kv_table() {
    let conn = Connection::open_in_memory().expect("open_in_memory failed");
    run_all(&conn).unwrap();
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='kv_store'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
    assert_eq!(get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopen_does_not_rerun_migrations() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tabs.db");

    drop(SqliteStore::open(path.to_str().unwrap()).unwrap());
    drop(SqliteStore::open(path.to_str().unwrap()).unwrap());

    let conn = Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_values_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tabs.db");
    let path = path.to_str().unwrap();

    let value = json!({"tabs": [{"id": "a", "title": "A", "url": "https://a.test"}]});
    SqliteStore::open(path).unwrap().set("yt-app-storage", &value).unwrap();

    let reopened = SqliteStore::open(path).unwrap();
    assert_eq!(reopened.get("yt-app-storage"), Some(value));
}

#[test]
fn test_values_are_stored_as_json_text() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.set("k", &json!({"active_tab_id": null})).unwrap();
    assert_eq!(
        store.get_raw("k").unwrap().as_deref(),
        Some(r#"{"active_tab_id":null}"#)
    );
    assert_eq!(store.get_raw("missing").unwrap(), None);
}
