//! Content View Controller, one per tab.
//!
//! Owns the tab's content surface and drives it through
//! `NotRendered -> Rendering -> Ready`. The surface is only created the first
//! time the tab becomes active. While active and ready, the controller
//! executes navigation signals, mirrors loading state and capabilities into
//! the store, and keeps the title current through the [`TitleResolver`].
//!
//! Capability flags belong to the surface and are always read live from it;
//! any read before `Ready` answers "no".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::managers::tab_store::{StoreHandle, TabStoreTrait};
use crate::services::oembed_client::MetadataLookup;
use crate::services::title_resolver::{Resolution, TitleResolver};
use crate::types::navigation::NavigationAction;
use crate::types::settings::{NavigationSettings, MIN_ZOOM_FLOOR};
use crate::types::tab::{ActiveTabPatch, TabPatch, DEFAULT_URL};
use crate::view::content_surface::{ContentSurface, SubscriptionId, SurfaceEvent, SurfaceFactory};

/// Lifecycle of a tab's content surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    NotRendered,
    Rendering,
    Ready,
}

/// Steps `current` by one zoom increment in the direction of `action` and
/// clamps to the configured bounds. Non-zoom actions return `current`.
///
/// Never panics: inverted bounds resolve to the upper one, and the result
/// never drops under [`MIN_ZOOM_FLOOR`].
pub fn step_zoom(current: f64, action: NavigationAction, nav: &NavigationSettings) -> f64 {
    let step = nav.zoom_step.abs();
    let next = match action {
        NavigationAction::ZoomIn => current + step,
        NavigationAction::ZoomOut => current - step,
        _ => return current,
    };
    let rounded = (next * 100.0).round() / 100.0;
    rounded
        .max(nav.zoom_min.max(MIN_ZOOM_FLOOR))
        .min(nav.zoom_max.max(MIN_ZOOM_FLOOR))
}

pub struct ContentViewController<F: SurfaceFactory, L: MetadataLookup> {
    tab_id: String,
    store: StoreHandle,
    factory: Arc<F>,
    resolver: TitleResolver<L>,
    nav: NavigationSettings,
    surface: Option<Arc<F::Surface>>,
    subscription: Option<SubscriptionId>,
    events: Option<UnboundedReceiver<SurfaceEvent>>,
    state: ViewState,
    ready: Arc<AtomicBool>,
    is_active: bool,
    signal_cursor: String,
    poller: Option<JoinHandle<()>>,
}

impl<F: SurfaceFactory, L: MetadataLookup> ContentViewController<F, L> {
    pub fn new(
        tab_id: &str,
        store: StoreHandle,
        factory: Arc<F>,
        lookup: Arc<L>,
        nav: NavigationSettings,
    ) -> Self {
        let resolver = TitleResolver::new(tab_id, store.clone(), lookup);
        Self {
            tab_id: tab_id.to_string(),
            store,
            factory,
            resolver,
            nav,
            surface: None,
            subscription: None,
            events: None,
            state: ViewState::NotRendered,
            ready: Arc::new(AtomicBool::new(false)),
            is_active: false,
            signal_cursor: String::new(),
            poller: None,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ViewState::Ready
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn surface(&self) -> Option<&Arc<F::Surface>> {
        self.surface.as_ref()
    }

    pub fn resolver(&self) -> &TitleResolver<L> {
        &self.resolver
    }

    /// Zoom bounds and poll period for subsequent commands; a running poller
    /// keeps its period until the next activation.
    pub fn set_navigation_settings(&mut self, nav: NavigationSettings) {
        self.nav = nav;
    }

    /// Marks the tab active or inactive.
    ///
    /// The first activation instantiates the surface. Every activation pushes
    /// a fresh capability snapshot, since the store's may belong to another
    /// tab. A view that is not ready yet reports "no" and still loading.
    pub fn set_active(&mut self, active: bool) {
        let was_active = self.is_active;
        self.is_active = active;

        if !active {
            self.stop_polling();
            return;
        }
        if self.state == ViewState::NotRendered {
            self.render();
        }
        if !was_active {
            // Commands issued before this activation belong to another tab.
            self.signal_cursor = self.store.read(|s| s.navigation_signal().id.clone());
            if self.is_ready() {
                self.sync_navigation_state();
            } else {
                self.store.update_active_tab_state_for(
                    &self.tab_id,
                    ActiveTabPatch::snapshot(false, false, true),
                );
            }
            self.start_polling();
        }
    }

    fn render(&mut self) {
        let initial_url = self
            .store
            .read(|s| s.get_tab(&self.tab_id).map(|t| t.url.clone()))
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let surface = self.factory.create(&self.tab_id, &initial_url);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscription = Some(surface.subscribe(tx));
        self.events = Some(rx);
        self.surface = Some(surface);
        self.state = ViewState::Rendering;
        log::debug!("Rendering tab {} at {}", self.tab_id, initial_url);
    }

    /// Releases the surface: unsubscribes, stops polling and returns to
    /// `NotRendered`. Also runs on drop.
    pub fn unmount(&mut self) {
        self.stop_polling();
        if let (Some(surface), Some(id)) = (self.surface.as_ref(), self.subscription.take()) {
            surface.unsubscribe(id);
        }
        self.events = None;
        self.surface = None;
        self.state = ViewState::NotRendered;
        self.ready.store(false, Ordering::SeqCst);
        self.resolver.reset_url_tracking();
    }

    /// Capabilities read live from the surface; all "no" before `Ready`.
    fn capabilities(&self) -> (bool, bool) {
        match (&self.surface, self.state) {
            (Some(surface), ViewState::Ready) => (surface.can_go_back(), surface.can_go_forward()),
            _ => (false, false),
        }
    }

    /// Pushes a full snapshot into the store if this tab is active and ready.
    pub fn sync_navigation_state(&self) {
        if !self.is_active || !self.is_ready() {
            return;
        }
        let Some(surface) = &self.surface else {
            return;
        };
        let (can_go_back, can_go_forward) = self.capabilities();
        self.store.update_active_tab_state_for(
            &self.tab_id,
            ActiveTabPatch::snapshot(can_go_back, can_go_forward, surface.is_loading()),
        );
    }

    /// Executes every navigation signal issued since the last one seen.
    ///
    /// Signals are consumed even when the view is inactive or not ready; they
    /// are not replayed later. Returns the number of commands executed.
    pub fn process_navigation(&mut self) -> usize {
        let pending = self.store.read(|s| s.signals_after(&self.signal_cursor));
        let Some(last) = pending.last() else {
            return 0;
        };
        self.signal_cursor = last.id.clone();

        if !self.is_active || !self.is_ready() {
            return 0;
        }
        pending
            .iter()
            .filter_map(|signal| signal.action)
            .filter(|action| self.dispatch(*action))
            .count()
    }

    fn dispatch(&self, action: NavigationAction) -> bool {
        let Some(surface) = &self.surface else {
            return false;
        };
        log::debug!("Navigation action {} on tab {}", action.as_str(), self.tab_id);
        match action {
            NavigationAction::Back => {
                if !surface.can_go_back() {
                    return false;
                }
                surface.go_back();
            }
            NavigationAction::Forward => {
                if !surface.can_go_forward() {
                    return false;
                }
                surface.go_forward();
            }
            NavigationAction::Reload => surface.reload(),
            NavigationAction::ZoomIn | NavigationAction::ZoomOut => {
                let current = surface.zoom_factor();
                let zoom = step_zoom(current, action, &self.nav);
                log::debug!("Zoom {} -> {}", current, zoom);
                surface.set_zoom_factor(zoom);
                self.store.update_tab(
                    &self.tab_id,
                    TabPatch {
                        zoom_level: Some(zoom),
                        ..TabPatch::default()
                    },
                );
            }
        }
        true
    }

    /// Handles one lifecycle event from the surface.
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> Option<Resolution> {
        let surface = Arc::clone(self.surface.as_ref()?);
        match event {
            SurfaceEvent::DomReady => {
                log::debug!("dom-ready for tab {}", self.tab_id);
                self.state = ViewState::Ready;
                self.ready.store(true, Ordering::SeqCst);

                let saved_zoom = self
                    .store
                    .read(|s| s.get_tab(&self.tab_id).and_then(|t| t.zoom_level));
                if let Some(zoom) = saved_zoom.filter(|z| (*z - 1.0).abs() > f64::EPSILON) {
                    surface.set_zoom_factor(zoom);
                }
                if self.is_active {
                    let (can_go_back, can_go_forward) = self.capabilities();
                    self.store.update_active_tab_state_for(
                        &self.tab_id,
                        ActiveTabPatch::snapshot(can_go_back, can_go_forward, false),
                    );
                }
                let url = surface.url();
                Some(self.resolver.resolve(&url, Some(surface.as_ref())).await)
            }
            SurfaceEvent::DidStartLoading => {
                self.store.update_tab(
                    &self.tab_id,
                    TabPatch {
                        is_loading: Some(true),
                        ..TabPatch::default()
                    },
                );
                if self.is_active {
                    self.store
                        .update_active_tab_state_for(&self.tab_id, ActiveTabPatch::loading(true));
                }
                None
            }
            SurfaceEvent::DidStopLoading => {
                let url = surface.url();
                self.store.update_tab(
                    &self.tab_id,
                    TabPatch {
                        is_loading: Some(false),
                        url: Some(url.clone()),
                        ..TabPatch::default()
                    },
                );
                if self.is_active && self.is_ready() {
                    let (can_go_back, can_go_forward) = self.capabilities();
                    self.store.update_active_tab_state_for(
                        &self.tab_id,
                        ActiveTabPatch::snapshot(can_go_back, can_go_forward, false),
                    );
                }
                self.resolve_if_ready(&surface, &url).await
            }
            SurfaceEvent::DidNavigate { url } => {
                let url = if url.is_empty() { surface.url() } else { url };
                self.record_url(&url);
                self.resolve_if_ready(&surface, &url).await
            }
            SurfaceEvent::DidNavigateInPage { url, is_main_frame } => {
                if !is_main_frame {
                    return None;
                }
                let url = if url.is_empty() { surface.url() } else { url };
                self.record_url(&url);
                self.resolve_if_ready(&surface, &url).await
            }
        }
    }

    fn record_url(&self, url: &str) {
        self.store.update_tab(
            &self.tab_id,
            TabPatch {
                url: Some(url.to_string()),
                ..TabPatch::default()
            },
        );
    }

    async fn resolve_if_ready(&self, surface: &Arc<F::Surface>, url: &str) -> Option<Resolution> {
        if !self.is_ready() {
            return None;
        }
        Some(self.resolver.resolve(url, Some(surface.as_ref())).await)
    }

    /// Waits for the next lifecycle event. `None` once unmounted.
    pub async fn next_event(&mut self) -> Option<SurfaceEvent> {
        self.events.as_mut()?.recv().await
    }

    /// Handles every event already queued, without waiting for more.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let event = match self.events.as_mut().map(|rx| rx.try_recv()) {
                Some(Ok(event)) => event,
                _ => break,
            };
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Starts the URL polling backstop for in-page route changes that emit
    /// no navigation event. Needs a tokio runtime; without one it is skipped.
    fn start_polling(&mut self) {
        if self.is_polling() {
            return;
        }
        let Some(surface) = self.surface.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::debug!("No runtime, URL polling disabled for tab {}", self.tab_id);
            return;
        };
        let resolver = self.resolver.clone();
        let ready = Arc::clone(&self.ready);
        let period = Duration::from_millis(self.nav.poll_interval_ms.max(1));
        let tab_id = self.tab_id.clone();

        self.poller = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !ready.load(Ordering::SeqCst) {
                    continue;
                }
                let current = surface.url();
                if current.is_empty() || current == resolver.last_url() {
                    continue;
                }
                log::debug!("Polling detected URL change on tab {}: {}", tab_id, current);
                resolver.resolve(&current, Some(surface.as_ref())).await;
            }
        }));
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
    }
}

impl<F: SurfaceFactory, L: MetadataLookup> Drop for ContentViewController<F, L> {
    fn drop(&mut self) {
        self.unmount();
    }
}
