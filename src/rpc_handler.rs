//! RPC method handler for the YTDesktop JSON protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. `handle_method`
//! dispatches one call to the tab store, settings or shortcuts of an [`App`];
//! `handle_view_method` routes the host's `view.*` reports to the remote
//! content surfaces.

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::managers::tab_store::TabStoreTrait;
use crate::services::oembed_client::MetadataLookup;
use crate::services::open_request::OpenOutcome;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::navigation::NavigationAction;
use crate::types::errors::SurfaceError;
use crate::types::tab::{Tab, TabPatch};
use crate::view::remote_surface::{RemoteSurfaceFactory, ViewReport};

fn str_param<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(|v| v.as_str())
}

fn required<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    str_param(params, name).ok_or_else(|| format!("missing {}", name))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Reads a `TabPatch` from `{"title"?, "url"?, "is_loading"?, "thumbnail"?, "zoom_level"?}`.
/// An explicit `"thumbnail": null` clears the thumbnail.
fn parse_patch(params: &Value) -> Result<TabPatch, String> {
    let thumbnail = match params.get("thumbnail") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(_) => return Err("invalid thumbnail".to_string()),
    };
    let zoom_level = match params.get("zoom_level") {
        None => None,
        Some(v) => match v.as_f64() {
            Some(z) if z.is_finite() && z > 0.0 => Some(z),
            _ => return Err("invalid zoom_level".to_string()),
        },
    };
    Ok(TabPatch {
        title: str_param(params, "title").map(str::to_string),
        url: str_param(params, "url").map(str::to_string),
        is_loading: params.get("is_loading").and_then(|v| v.as_bool()),
        thumbnail,
        zoom_level,
    })
}

/// Dispatch one RPC call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method<L: MetadataLookup>(
    app: &App<L>,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Tabs ───
        "state.get" => to_json(&app.store.snapshot()),
        "tab.add" => {
            let url = str_param(params, "url");
            if let Some(u) = url {
                if !u.starts_with("http://") && !u.starts_with("https://") {
                    return Err("invalid url: must start with http:// or https://".to_string());
                }
            }
            let active = params.get("active").and_then(|v| v.as_bool()).unwrap_or(true);
            let title = str_param(params, "title");
            let thumbnail = str_param(params, "thumbnail");
            let id = app
                .store
                .write(|s| s.add_tab(url, active, title, thumbnail));
            Ok(json!({"id": id}))
        }
        "tab.close" => {
            let id = required(params, "id")?;
            app.store.write(|s| s.close_tab(id));
            Ok(json!({"ok": true}))
        }
        "tab.activate" => {
            let id = required(params, "id")?;
            let active = app.store.write(|s| {
                s.set_active_tab(id);
                s.active_tab_id().map(str::to_string)
            });
            Ok(json!({"active_tab_id": active}))
        }
        "tab.update" => {
            let id = required(params, "id")?;
            let patch = parse_patch(params)?;
            app.store.update_tab(id, patch);
            Ok(json!({"ok": true}))
        }
        "tab.reorder" => {
            let ids: Vec<&str> = params
                .get("ids")
                .and_then(|v| v.as_array())
                .ok_or("missing ids")?
                .iter()
                .map(|v| v.as_str().ok_or("ids must be strings"))
                .collect::<Result<_, _>>()?;
            let applied = app.store.write(|s| {
                let order: Vec<Tab> = ids
                    .iter()
                    .map(|id| {
                        s.get_tab(id)
                            .cloned()
                            .unwrap_or_else(|| Tab::new(*id, "", ""))
                    })
                    .collect();
                s.reorder_tabs(&order)
            });
            if !applied {
                return Err("ids must be a permutation of the open tabs".to_string());
            }
            Ok(json!({"ok": true}))
        }
        "tab.open_routed" => {
            let url = required(params, "url")?;
            match app.open_router.open_in_background(url).await {
                OpenOutcome::Opened(id) => Ok(json!({"id": id})),
                OpenOutcome::Debounced => Ok(json!({"id": null, "debounced": true})),
                OpenOutcome::Rejected => Err(format!("unsupported url: {}", url)),
            }
        }

        // ─── Navigation ───
        "nav.trigger" => {
            let action = match params.get("action") {
                None | Some(Value::Null) => None,
                Some(v) => {
                    let name = v.as_str().ok_or("action must be a string")?;
                    Some(
                        NavigationAction::parse(name)
                            .ok_or_else(|| format!("unknown action: {}", name))?,
                    )
                }
            };
            let signal = app.store.write(|s| s.trigger_navigation(action));
            to_json(&signal)
        }
        "nav.active_state" => {
            let state = app.store.read(|s| s.active_tab_state());
            to_json(&state)
        }

        // ─── Shortcuts ───
        "shortcut.dispatch" => {
            let keys = required(params, "keys")?;
            let action = app.handle_shortcut(keys);
            Ok(json!({"action": action}))
        }
        "shortcut.list" => {
            let shortcuts = app.shortcut_manager().list_shortcuts().clone();
            to_json(&shortcuts)
        }

        // ─── Settings ───
        "settings.get" => match str_param(params, "key") {
            Some(key) => app
                .settings_engine()
                .get_value(key)
                .ok_or_else(|| format!("unknown setting: {}", key)),
            None => to_json(app.settings_engine().get_settings()),
        },
        "settings.set" => {
            let key = required(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.settings_engine()
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            if key.starts_with("shortcuts") {
                app.reload_shortcuts();
            }
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

/// Dispatch one `view.*` call from the host process.
///
/// `view.event` carries a lifecycle event and/or state for one tab's view;
/// `view.script_result` answers an `execute_script` command.
pub fn handle_view_method(
    views: &RemoteSurfaceFactory,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "view.event" => {
            let report: ViewReport = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid view report: {}", e))?;
            let delivered = views.report(&report)?;
            Ok(json!({"delivered": delivered}))
        }
        "view.script_result" => {
            let tab_id = required(params, "tab_id")?;
            let request_id = params
                .get("request_id")
                .and_then(|v| v.as_u64())
                .ok_or("missing request_id")?;
            let result = match str_param(params, "error") {
                Some(err) => Err(SurfaceError::Script(err.to_string())),
                None => Ok(params.get("result").cloned().unwrap_or(Value::Null)),
            };
            let accepted = views.script_result(tab_id, request_id, result);
            Ok(json!({"accepted": accepted}))
        }
        _ => Err(format!("unknown method: {}", method)),
    }
}
