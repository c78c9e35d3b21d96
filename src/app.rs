//! App Core for YTDesktop.
//!
//! Central struct wiring the tab store, its persistence, settings, shortcuts
//! and the metadata lookup together. Content views are created per host
//! window through [`App::view_host`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::managers::session_manager::SessionManager;
use crate::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use crate::managers::tab_store::{StoreHandle, TabStore, TabStoreTrait};
use crate::platform;
use crate::services::key_value_store::{KeyValueStore, SqliteStore};
use crate::services::oembed_client::{MetadataLookup, OEmbedClient};
use crate::services::open_request::OpenRequestRouter;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::navigation::NavigationAction;
use crate::types::settings::AppSettings;
use crate::view::content_surface::SurfaceFactory;
use crate::view::view_host::ViewHost;

/// Central application struct.
pub struct App<L: MetadataLookup = OEmbedClient> {
    pub store: StoreHandle,
    pub lookup: Arc<L>,
    pub settings_engine: Mutex<SettingsEngine>,
    pub shortcut_manager: Mutex<ShortcutManager>,
    pub open_router: OpenRequestRouter<L>,
}

impl App<OEmbedClient> {
    /// Opens (or creates) the tab database and settings file and rehydrates
    /// the store. `None` paths use the platform defaults.
    pub fn new(
        db_path: Option<&str>,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            log::warn!("Settings unreadable, using defaults: {}", e);
        }

        let db_path = match db_path {
            Some(p) => p.to_string(),
            None => {
                let path = platform::default_database_path();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                path.to_string_lossy().to_string()
            }
        };
        let kv = SqliteStore::open(&db_path)
            .map_err(|e| format!("Tab database init failed: {}", e))?;

        let lookup = OEmbedClient::new(&settings_engine.get_settings().oembed)
            .map_err(|e| format!("oEmbed client init failed: {}", e))?;

        log::info!("Tab database at {}", db_path);
        Ok(Self::with_parts(settings_engine, Box::new(kv), Arc::new(lookup)))
    }
}

impl<L: MetadataLookup> App<L> {
    /// Assembles an app from already constructed parts.
    pub fn with_parts(
        settings_engine: SettingsEngine,
        kv: Box<dyn KeyValueStore>,
        lookup: Arc<L>,
    ) -> Self {
        let settings = settings_engine.get_settings().clone();
        let general = &settings.general;

        let session = SessionManager::new(
            kv,
            &general.storage_key,
            &general.home_url,
            &general.default_title,
        );
        let store = StoreHandle::new(TabStore::init(
            session,
            &general.home_url,
            &general.default_title,
        ));
        let open_router = OpenRequestRouter::new(
            store.clone(),
            Arc::clone(&lookup),
            Duration::from_millis(settings.routing.open_debounce_ms),
        );

        Self {
            store,
            lookup,
            settings_engine: Mutex::new(settings_engine),
            shortcut_manager: Mutex::new(ShortcutManager::from_bindings(&settings.shortcuts)),
            open_router,
        }
    }

    pub fn settings(&self) -> AppSettings {
        self.settings_engine().get_settings().clone()
    }

    pub fn settings_engine(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn shortcut_manager(&self) -> MutexGuard<'_, ShortcutManager> {
        self.shortcut_manager.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rebuilds the shortcut table after the `shortcuts` settings changed.
    pub fn reload_shortcuts(&self) {
        let bindings: HashMap<String, String> = self.settings().shortcuts;
        *self.shortcut_manager() = ShortcutManager::from_bindings(&bindings);
    }

    /// Runs the action bound to `keys`. Returns the action name, or `None`
    /// when nothing is bound.
    pub fn handle_shortcut(&self, keys: &str) -> Option<String> {
        let action = self.shortcut_manager().action_for_keys(keys)?.to_string();
        let navigation = match action.as_str() {
            "new_tab" => {
                self.store.write(|s| s.add_tab(None, true, None, None));
                None
            }
            "close_tab" => {
                self.store.write(|s| {
                    if let Some(id) = s.active_tab_id().map(str::to_string) {
                        s.close_tab(&id);
                    }
                });
                None
            }
            "reload" => Some(NavigationAction::Reload),
            "back" => Some(NavigationAction::Back),
            "forward" => Some(NavigationAction::Forward),
            "zoom_in" => Some(NavigationAction::ZoomIn),
            "zoom_out" => Some(NavigationAction::ZoomOut),
            other => {
                log::debug!("Shortcut '{}' has no handler", other);
                return None;
            }
        };
        if let Some(nav) = navigation {
            self.store.write(|s| s.trigger_navigation(Some(nav)));
        }
        log::debug!("Shortcut {} -> {}", keys, action);
        Some(action)
    }

    /// Creates the content-view host for one window.
    pub fn view_host<F: SurfaceFactory>(&self, factory: Arc<F>) -> ViewHost<F, L> {
        ViewHost::new(
            self.store.clone(),
            factory,
            Arc::clone(&self.lookup),
            self.settings().navigation,
        )
    }
}
