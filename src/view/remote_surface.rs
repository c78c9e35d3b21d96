//! Content surface whose real web view lives in the host process.
//!
//! Commands for the view leave through an outbound channel as
//! [`ViewCommand`]s. The host answers over the RPC channel with
//! [`ViewReport`]s (lifecycle events plus the view's current state) and
//! script results. Reports update the mirrored state before the event is
//! delivered, so a controller reacting to it reads fresh capabilities.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

use crate::types::errors::SurfaceError;
use crate::view::content_surface::{
    ContentSurface, SubscriberList, SubscriptionId, SurfaceEvent, SurfaceFactory,
};

/// How long a script evaluation waits for the host's answer.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// One instruction for the host's web view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SurfaceCommand {
    Create { url: String },
    GoBack,
    GoForward,
    Reload,
    SetZoomFactor { factor: f64 },
    ExecuteScript { request_id: u64, script: String },
    Destroy,
}

/// A [`SurfaceCommand`] addressed to one tab's view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewCommand {
    pub tab_id: String,
    #[serde(flatten)]
    pub command: SurfaceCommand,
}

/// What the host reports about one view. Absent state fields keep their
/// previous value; `event` is optional so a report can carry state alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewReport {
    pub tab_id: String,
    pub event: Option<String>,
    pub url: Option<String>,
    pub is_main_frame: Option<bool>,
    pub can_go_back: Option<bool>,
    pub can_go_forward: Option<bool>,
    pub is_loading: Option<bool>,
    pub zoom_factor: Option<f64>,
}

impl ViewReport {
    /// Maps the wire event name (`dom_ready`, `did_start_loading`,
    /// `did_stop_loading`, `did_navigate`, `did_navigate_in_page`).
    pub fn surface_event(&self) -> Result<Option<SurfaceEvent>, String> {
        let Some(name) = self.event.as_deref() else {
            return Ok(None);
        };
        let url = self.url.clone().unwrap_or_default();
        let event = match name {
            "dom_ready" => SurfaceEvent::DomReady,
            "did_start_loading" => SurfaceEvent::DidStartLoading,
            "did_stop_loading" => SurfaceEvent::DidStopLoading,
            "did_navigate" => SurfaceEvent::DidNavigate { url },
            "did_navigate_in_page" => SurfaceEvent::DidNavigateInPage {
                url,
                is_main_frame: self.is_main_frame.unwrap_or(true),
            },
            other => return Err(format!("unknown view event: {}", other)),
        };
        Ok(Some(event))
    }
}

#[derive(Debug, Clone)]
struct Mirror {
    url: String,
    zoom_factor: f64,
    can_go_back: bool,
    can_go_forward: bool,
    is_loading: bool,
}

type PendingScripts = HashMap<u64, oneshot::Sender<Result<Value, SurfaceError>>>;

pub struct RemoteSurface {
    tab_id: String,
    state: Mutex<Mirror>,
    subscribers: SubscriberList,
    outbound: UnboundedSender<ViewCommand>,
    next_request: AtomicU64,
    pending: Mutex<PendingScripts>,
    script_timeout: Duration,
}

impl RemoteSurface {
    fn new(
        tab_id: &str,
        initial_url: &str,
        outbound: UnboundedSender<ViewCommand>,
        script_timeout: Duration,
    ) -> Self {
        Self {
            tab_id: tab_id.to_string(),
            state: Mutex::new(Mirror {
                url: initial_url.to_string(),
                zoom_factor: 1.0,
                can_go_back: false,
                can_go_forward: false,
                is_loading: true,
            }),
            subscribers: SubscriberList::new(),
            outbound,
            next_request: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            script_timeout,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    fn mirror(&self) -> MutexGuard<'_, Mirror> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pending(&self) -> MutexGuard<'_, PendingScripts> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn send(&self, command: SurfaceCommand) -> bool {
        let sent = self
            .outbound
            .send(ViewCommand {
                tab_id: self.tab_id.clone(),
                command,
            })
            .is_ok();
        if !sent {
            log::warn!("View channel closed, command for tab {} dropped", self.tab_id);
        }
        sent
    }

    /// Applies the report's state, then delivers its event, if any.
    pub fn apply_report(&self, report: &ViewReport, event: Option<SurfaceEvent>) {
        {
            let mut mirror = self.mirror();
            if let Some(url) = report.url.as_ref().filter(|u| !u.is_empty()) {
                if report.is_main_frame != Some(false) {
                    mirror.url = url.clone();
                }
            }
            if let Some(v) = report.can_go_back {
                mirror.can_go_back = v;
            }
            if let Some(v) = report.can_go_forward {
                mirror.can_go_forward = v;
            }
            if let Some(v) = report.is_loading {
                mirror.is_loading = v;
            }
            if let Some(z) = report.zoom_factor.filter(|z| z.is_finite() && *z > 0.0) {
                mirror.zoom_factor = z;
            }
        }
        if let Some(event) = event {
            self.subscribers.emit(event);
        }
    }

    /// Hands a script result to the evaluation waiting on `request_id`.
    /// `false` if nothing waits for it any more.
    pub fn complete_script(&self, request_id: u64, result: Result<Value, SurfaceError>) -> bool {
        match self.pending().remove(&request_id) {
            Some(waiter) => waiter.send(result).is_ok(),
            None => false,
        }
    }

    pub fn pending_scripts(&self) -> usize {
        self.pending().len()
    }
}

impl ContentSurface for RemoteSurface {
    fn url(&self) -> String {
        self.mirror().url.clone()
    }

    fn zoom_factor(&self) -> f64 {
        self.mirror().zoom_factor
    }

    fn set_zoom_factor(&self, factor: f64) {
        self.mirror().zoom_factor = factor;
        self.send(SurfaceCommand::SetZoomFactor { factor });
    }

    fn can_go_back(&self) -> bool {
        self.mirror().can_go_back
    }

    fn can_go_forward(&self) -> bool {
        self.mirror().can_go_forward
    }

    fn is_loading(&self) -> bool {
        self.mirror().is_loading
    }

    fn go_back(&self) {
        self.send(SurfaceCommand::GoBack);
    }

    fn go_forward(&self) {
        self.send(SurfaceCommand::GoForward);
    }

    fn reload(&self) {
        self.send(SurfaceCommand::Reload);
    }

    async fn execute_script(&self, script: &str) -> Result<Value, SurfaceError> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(request_id, tx);

        let command = SurfaceCommand::ExecuteScript {
            request_id,
            script: script.to_string(),
        };
        if !self.send(command) {
            self.pending().remove(&request_id);
            return Err(SurfaceError::NotReady);
        }

        match tokio::time::timeout(self.script_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SurfaceError::NotReady),
            Err(_) => {
                self.pending().remove(&request_id);
                Err(SurfaceError::Script(format!(
                    "no answer for script {} on tab {}",
                    request_id, self.tab_id
                )))
            }
        }
    }

    fn subscribe(&self, sink: UnboundedSender<SurfaceEvent>) -> SubscriptionId {
        self.subscribers.add(sink)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.remove(id);
    }
}

impl Drop for RemoteSurface {
    fn drop(&mut self) {
        self.send(SurfaceCommand::Destroy);
    }
}

/// Creates [`RemoteSurface`]s and routes host reports to them by tab id.
pub struct RemoteSurfaceFactory {
    outbound: UnboundedSender<ViewCommand>,
    surfaces: Mutex<HashMap<String, Weak<RemoteSurface>>>,
    script_timeout: Duration,
}

impl RemoteSurfaceFactory {
    pub fn new(outbound: UnboundedSender<ViewCommand>) -> Self {
        Self {
            outbound,
            surfaces: Mutex::new(HashMap::new()),
            script_timeout: SCRIPT_TIMEOUT,
        }
    }

    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    fn surfaces(&self) -> MutexGuard<'_, HashMap<String, Weak<RemoteSurface>>> {
        self.surfaces.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The live surface of `tab_id`, if its view is still mounted.
    pub fn surface(&self, tab_id: &str) -> Option<Arc<RemoteSurface>> {
        self.surfaces().get(tab_id).and_then(Weak::upgrade)
    }

    pub fn live_count(&self) -> usize {
        self.surfaces()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Routes a host report. `Ok(false)` when the tab has no mounted view;
    /// an unknown event name is an error.
    pub fn report(&self, report: &ViewReport) -> Result<bool, String> {
        let event = report.surface_event()?;
        match self.surface(&report.tab_id) {
            Some(surface) => {
                surface.apply_report(report, event);
                Ok(true)
            }
            None => {
                log::debug!("Report for unmounted tab {} ignored", report.tab_id);
                Ok(false)
            }
        }
    }

    pub fn script_result(
        &self,
        tab_id: &str,
        request_id: u64,
        result: Result<Value, SurfaceError>,
    ) -> bool {
        self.surface(tab_id)
            .is_some_and(|surface| surface.complete_script(request_id, result))
    }
}

impl SurfaceFactory for RemoteSurfaceFactory {
    type Surface = RemoteSurface;

    fn create(&self, tab_id: &str, initial_url: &str) -> Arc<RemoteSurface> {
        let surface = Arc::new(RemoteSurface::new(
            tab_id,
            initial_url,
            self.outbound.clone(),
            self.script_timeout,
        ));
        surface.send(SurfaceCommand::Create {
            url: initial_url.to_string(),
        });
        let mut surfaces = self.surfaces();
        surfaces.retain(|_, w| w.strong_count() > 0);
        surfaces.insert(tab_id.to_string(), Arc::downgrade(&surface));
        surface
    }
}
