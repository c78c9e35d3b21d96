//! The embedded web-content surface seam.
//!
//! Rendering is delegated entirely to an external component. This module
//! describes what a view controller needs from it: capability queries,
//! navigation commands, script evaluation and a lifecycle event stream with
//! explicit subscribe/unsubscribe.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::services::title_resolver::DocumentTitleSource;
use crate::types::errors::SurfaceError;

/// Lifecycle events emitted by a content surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    DomReady,
    DidStartLoading,
    DidStopLoading,
    DidNavigate { url: String },
    DidNavigateInPage { url: String, is_main_frame: bool },
}

/// Handle returned by [`ContentSurface::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Trait defining the content-surface capability interface.
pub trait ContentSurface: Send + Sync + 'static {
    fn url(&self) -> String;
    fn zoom_factor(&self) -> f64;
    fn set_zoom_factor(&self, factor: f64);
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    fn is_loading(&self) -> bool;
    fn go_back(&self);
    fn go_forward(&self);
    fn reload(&self);
    fn execute_script(
        &self,
        script: &str,
    ) -> impl Future<Output = Result<Value, SurfaceError>> + Send;
    /// Registers `sink` for lifecycle events until [`unsubscribe`](Self::unsubscribe).
    fn subscribe(&self, sink: UnboundedSender<SurfaceEvent>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Creates surfaces on demand; background tabs never call this until shown.
pub trait SurfaceFactory: Send + Sync + 'static {
    type Surface: ContentSurface;

    fn create(&self, tab_id: &str, initial_url: &str) -> Arc<Self::Surface>;
}

impl<S: ContentSurface> DocumentTitleSource for S {
    async fn document_title(&self) -> Option<String> {
        match self.execute_script("document.title").await {
            Ok(Value::String(title)) => Some(title),
            Ok(_) => None,
            Err(e) => {
                log::debug!("document.title unavailable: {}", e);
                None
            }
        }
    }
}

/// Subscriber bookkeeping for surface adapters.
#[derive(Default)]
pub struct SubscriberList {
    next_id: AtomicU64,
    sinks: Mutex<Vec<(SubscriptionId, UnboundedSender<SurfaceEvent>)>>,
}

impl SubscriberList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, sink: UnboundedSender<SurfaceEvent>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, sink));
        id
    }

    pub fn remove(&self, id: SubscriptionId) {
        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(sid, _)| *sid != id);
    }

    pub fn len(&self) -> usize {
        self.sinks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every live subscriber, pruning closed channels.
    pub fn emit(&self, event: SurfaceEvent) {
        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(_, sink)| sink.send(event.clone()).is_ok());
    }
}
