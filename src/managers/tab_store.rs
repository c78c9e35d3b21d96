//! Tab Store.
//!
//! Single source of truth for the ordered tab list, the active pointer, the
//! active tab's navigation capabilities and the latest navigation signal.
//! Every operation is total: unknown ids are ignored so that late results for
//! a tab that has already closed are harmless.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use uuid::Uuid;

use crate::managers::navigation_bridge::NavigationBridge;
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::types::navigation::{NavigationAction, NavigationSignal};
use crate::types::session::{PersistedTab, PersistedTabs};
use crate::types::tab::{ActiveTabPatch, ActiveTabState, Tab, TabPatch, DEFAULT_TITLE, DEFAULT_URL};

/// Trait defining the tab store interface.
pub trait TabStoreTrait {
    fn add_tab(
        &mut self,
        url: Option<&str>,
        active: bool,
        title: Option<&str>,
        thumbnail: Option<&str>,
    ) -> String;
    fn close_tab(&mut self, tab_id: &str);
    fn set_active_tab(&mut self, tab_id: &str);
    fn update_tab(&mut self, tab_id: &str, patch: TabPatch);
    fn reorder_tabs(&mut self, new_order: &[Tab]) -> bool;
    fn trigger_navigation(&mut self, action: Option<NavigationAction>) -> NavigationSignal;
    fn update_active_tab_state(&mut self, patch: ActiveTabPatch);
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn tabs(&self) -> &[Tab];
    fn active_tab_id(&self) -> Option<&str>;
    fn active_tab(&self) -> Option<&Tab>;
    fn active_tab_state(&self) -> ActiveTabState;
    fn navigation_signal(&self) -> &NavigationSignal;
    fn tab_count(&self) -> usize;
}

/// Everything the titlebar and tab strip render from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreSnapshot {
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<String>,
    pub active_tab_state: ActiveTabState,
    pub navigation_signal: NavigationSignal,
    pub revision: u64,
}

/// In-memory tab store, optionally persisted through a [`SessionManager`].
pub struct TabStore {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
    active_tab_state: ActiveTabState,
    navigation: NavigationBridge,
    session: Option<SessionManager>,
    home_url: String,
    default_title: String,
    revision: u64,
}

impl TabStore {
    /// Creates an unpersisted store holding one default tab.
    pub fn new() -> Self {
        Self::with_defaults(DEFAULT_URL, DEFAULT_TITLE)
    }

    pub fn with_defaults(home_url: &str, default_title: &str) -> Self {
        let tab = Tab::new(Uuid::new_v4().to_string(), home_url, default_title);
        let active_tab_id = Some(tab.id.clone());
        Self {
            tabs: vec![tab],
            active_tab_id,
            active_tab_state: ActiveTabState::default(),
            navigation: NavigationBridge::new(),
            session: None,
            home_url: home_url.to_string(),
            default_title: default_title.to_string(),
            revision: 0,
        }
    }

    /// Constructs the store from the default state, then rehydrates it from
    /// `session`. All later mutations are written back through it.
    pub fn init(session: SessionManager, home_url: &str, default_title: &str) -> Self {
        let restored = session.restore();
        let mut store = Self::with_defaults(home_url, default_title);
        store.tabs = restored.tabs;
        store.active_tab_id = restored.active_tab_id;
        store.session = Some(session);
        store
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tabs: self.tabs.clone(),
            active_tab_id: self.active_tab_id.clone(),
            active_tab_state: self.active_tab_state,
            navigation_signal: self.navigation.latest().clone(),
            revision: self.revision,
        }
    }

    /// Signals issued after `last_seen_id`, oldest first.
    pub fn signals_after(&self, last_seen_id: &str) -> Vec<NavigationSignal> {
        self.navigation.signals_after(last_seen_id)
    }

    pub fn persisted(&self) -> PersistedTabs {
        PersistedTabs {
            tabs: self.tabs.iter().map(PersistedTab::from).collect(),
            active_tab_id: self.active_tab_id.clone(),
        }
    }

    fn default_tab(&self) -> Tab {
        Tab::new(Uuid::new_v4().to_string(), &self.home_url, &self.default_title)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Writes the persisted subset. Failures are logged, never surfaced.
    fn persist(&self) {
        if let Some(session) = &self.session {
            if let Err(e) = session.save(&self.persisted()) {
                log::warn!("Failed to persist tabs: {}", e);
            }
        }
    }

    fn is_permutation(&self, new_order: &[Tab]) -> bool {
        if new_order.len() != self.tabs.len() {
            return false;
        }
        let current: HashSet<&str> = self.tabs.iter().map(|t| t.id.as_str()).collect();
        let mut seen = HashSet::with_capacity(new_order.len());
        new_order
            .iter()
            .all(|t| current.contains(t.id.as_str()) && seen.insert(t.id.as_str()))
    }
}

impl Default for TabStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TabStoreTrait for TabStore {
    /// Appends a new tab and returns its id. An active tab starts with no
    /// history and in the loading state.
    fn add_tab(
        &mut self,
        url: Option<&str>,
        active: bool,
        title: Option<&str>,
        thumbnail: Option<&str>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let mut tab = Tab::new(
            id.clone(),
            url.unwrap_or(&self.home_url),
            title.unwrap_or(&self.default_title),
        );
        tab.thumbnail = thumbnail.map(str::to_string);
        self.tabs.push(tab);

        if active {
            self.active_tab_id = Some(id.clone());
            self.active_tab_state = ActiveTabState::fresh_loading();
        }
        self.touch();
        self.persist();
        id
    }

    /// Removes a tab. Closing the active tab selects the tab now at the end of
    /// the list; closing the only tab replaces it with a default tab.
    fn close_tab(&mut self, tab_id: &str) {
        let Some(idx) = self.tabs.iter().position(|t| t.id == tab_id) else {
            return;
        };
        self.tabs.remove(idx);

        if self.tabs.is_empty() {
            let tab = self.default_tab();
            self.active_tab_id = Some(tab.id.clone());
            self.tabs.push(tab);
            self.active_tab_state = ActiveTabState::default();
        } else if self.active_tab_id.as_deref() == Some(tab_id) {
            self.active_tab_id = self.tabs.last().map(|t| t.id.clone());
        }
        self.touch();
        self.persist();
    }

    /// Moves the active pointer only. The newly active view controller pushes
    /// a fresh capability snapshot once it observes the switch.
    fn set_active_tab(&mut self, tab_id: &str) {
        if !self.tabs.iter().any(|t| t.id == tab_id) {
            return;
        }
        self.active_tab_id = Some(tab_id.to_string());
        self.touch();
        self.persist();
    }

    fn update_tab(&mut self, tab_id: &str, patch: TabPatch) {
        let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) else {
            return;
        };
        tab.apply(&patch);
        self.touch();
        self.persist();
    }

    /// Replaces the order with `new_order`. The list must be a permutation of
    /// the current ids; anything else is rejected and `false` returned. Tab
    /// contents are taken from the store, only the order from the caller.
    fn reorder_tabs(&mut self, new_order: &[Tab]) -> bool {
        if !self.is_permutation(new_order) {
            log::warn!(
                "Rejected reorder: {} entries do not permute the {} open tabs",
                new_order.len(),
                self.tabs.len()
            );
            return false;
        }
        let mut remaining = std::mem::take(&mut self.tabs);
        for wanted in new_order {
            if let Some(pos) = remaining.iter().position(|t| t.id == wanted.id) {
                self.tabs.push(remaining.swap_remove(pos));
            }
        }
        self.touch();
        self.persist();
        true
    }

    fn trigger_navigation(&mut self, action: Option<NavigationAction>) -> NavigationSignal {
        let signal = self.navigation.issue(action);
        self.touch();
        signal
    }

    fn update_active_tab_state(&mut self, patch: ActiveTabPatch) {
        self.active_tab_state.apply(&patch);
        self.touch();
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .as_ref()
            .and_then(|id| self.tabs.iter().find(|t| t.id == *id))
    }

    fn active_tab_state(&self) -> ActiveTabState {
        self.active_tab_state
    }

    fn navigation_signal(&self) -> &NavigationSignal {
        self.navigation.latest()
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}

/// Cloneable handle to the one store instance of a process.
///
/// Every mutation runs to completion under the lock, so no two mutations
/// interleave.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<TabStore>>,
}

impl StoreHandle {
    pub fn new(store: TabStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&TabStore) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut TabStore) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.read(|s| s.snapshot())
    }

    pub fn is_active(&self, tab_id: &str) -> bool {
        self.read(|s| s.active_tab_id() == Some(tab_id))
    }

    pub fn update_tab(&self, tab_id: &str, patch: TabPatch) {
        self.write(|s| s.update_tab(tab_id, patch));
    }

    pub fn update_active_tab_state(&self, patch: ActiveTabPatch) {
        self.write(|s| s.update_active_tab_state(patch));
    }

    /// Applies `patch` only if `tab_id` is still the active tab, checked under
    /// the same lock as the write. Returns whether it was applied.
    pub fn update_active_tab_state_for(&self, tab_id: &str, patch: ActiveTabPatch) -> bool {
        self.write(|s| {
            if s.active_tab_id() != Some(tab_id) {
                return false;
            }
            s.update_active_tab_state(patch);
            true
        })
    }
}

impl Default for StoreHandle {
    fn default() -> Self {
        Self::new(TabStore::new())
    }
}
