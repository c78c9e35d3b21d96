//! Test doubles shared by the integration tests: a scripted content surface,
//! a factory that records what it created, and a metadata lookup with canned
//! answers and optional latency.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use ytdesktop::managers::tab_store::{StoreHandle, TabStoreTrait};
use ytdesktop::services::oembed_client::MetadataLookup;
use ytdesktop::types::errors::{LookupError, SurfaceError};
use ytdesktop::types::video::VideoInfo;
use ytdesktop::view::content_surface::{
    ContentSurface, SubscriberList, SubscriptionId, SurfaceEvent, SurfaceFactory,
};

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=abc123";
pub const OTHER_VIDEO_URL: &str = "https://youtu.be/xyz789";
pub const CHANNEL_URL: &str = "https://www.youtube.com/@somechannel";

#[derive(Debug, Clone)]
struct SurfaceState {
    url: String,
    zoom: f64,
    can_go_back: bool,
    can_go_forward: bool,
    is_loading: bool,
    title: Option<String>,
    back_calls: usize,
    forward_calls: usize,
    reload_calls: usize,
}

/// Scripted content surface. Tests drive it with setters and [`emit`](Self::emit).
pub struct MockSurface {
    state: Mutex<SurfaceState>,
    subscribers: SubscriberList,
}

impl MockSurface {
    pub fn new(url: &str) -> Self {
        Self {
            state: Mutex::new(SurfaceState {
                url: url.to_string(),
                zoom: 1.0,
                can_go_back: false,
                can_go_forward: false,
                is_loading: false,
                title: None,
                back_calls: 0,
                forward_calls: 0,
                reload_calls: 0,
            }),
            subscribers: SubscriberList::new(),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SurfaceState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn emit(&self, event: SurfaceEvent) {
        self.subscribers.emit(event);
    }

    pub fn set_url(&self, url: &str) {
        self.with(|s| s.url = url.to_string());
    }

    pub fn set_history(&self, can_go_back: bool, can_go_forward: bool) {
        self.with(|s| {
            s.can_go_back = can_go_back;
            s.can_go_forward = can_go_forward;
        });
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.with(|s| s.is_loading = is_loading);
    }

    pub fn set_title(&self, title: &str) {
        self.with(|s| s.title = Some(title.to_string()));
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.with(|s| s.zoom = zoom);
    }

    pub fn back_calls(&self) -> usize {
        self.with(|s| s.back_calls)
    }

    pub fn forward_calls(&self) -> usize {
        self.with(|s| s.forward_calls)
    }

    pub fn reload_calls(&self) -> usize {
        self.with(|s| s.reload_calls)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl ContentSurface for MockSurface {
    fn url(&self) -> String {
        self.with(|s| s.url.clone())
    }

    fn zoom_factor(&self) -> f64 {
        self.with(|s| s.zoom)
    }

    fn set_zoom_factor(&self, factor: f64) {
        self.with(|s| s.zoom = factor);
    }

    fn can_go_back(&self) -> bool {
        self.with(|s| s.can_go_back)
    }

    fn can_go_forward(&self) -> bool {
        self.with(|s| s.can_go_forward)
    }

    fn is_loading(&self) -> bool {
        self.with(|s| s.is_loading)
    }

    fn go_back(&self) {
        self.with(|s| s.back_calls += 1);
    }

    fn go_forward(&self) {
        self.with(|s| s.forward_calls += 1);
    }

    fn reload(&self) {
        self.with(|s| s.reload_calls += 1);
    }

    async fn execute_script(&self, script: &str) -> Result<Value, SurfaceError> {
        if script != "document.title" {
            return Err(SurfaceError::Script(format!("unsupported: {}", script)));
        }
        match self.with(|s| s.title.clone()) {
            Some(title) => Ok(Value::String(title)),
            None => Err(SurfaceError::NotReady),
        }
    }

    fn subscribe(&self, sink: UnboundedSender<SurfaceEvent>) -> SubscriptionId {
        self.subscribers.add(sink)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.remove(id);
    }
}

/// Factory that keeps every surface it creates, keyed by tab id.
#[derive(Default)]
pub struct MockFactory {
    surfaces: Mutex<HashMap<String, Arc<MockSurface>>>,
    created: AtomicUsize,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn surface(&self, tab_id: &str) -> Arc<MockSurface> {
        Arc::clone(
            self.surfaces
                .lock()
                .unwrap()
                .get(tab_id)
                .expect("surface was never created"),
        )
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl SurfaceFactory for MockFactory {
    type Surface = MockSurface;

    fn create(&self, tab_id: &str, initial_url: &str) -> Arc<MockSurface> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let surface = Arc::new(MockSurface::new(initial_url));
        self.surfaces
            .lock()
            .unwrap()
            .insert(tab_id.to_string(), Arc::clone(&surface));
        surface
    }
}

/// Metadata lookup with canned answers per video id.
#[derive(Default)]
pub struct MockLookup {
    answers: Mutex<HashMap<String, (Result<VideoInfo, u16>, Duration)>>,
    calls: AtomicUsize,
}

impl MockLookup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, video_id: &str, title: &str, thumbnail: Option<&str>) {
        self.answer_after(video_id, title, thumbnail, Duration::ZERO);
    }

    pub fn answer_after(&self, video_id: &str, title: &str, thumbnail: Option<&str>, delay: Duration) {
        let info = VideoInfo {
            title: Some(title.to_string()),
            thumbnail: thumbnail.map(str::to_string),
        };
        self.answers
            .lock()
            .unwrap()
            .insert(video_id.to_string(), (Ok(info), delay));
    }

    pub fn fail(&self, video_id: &str, status: u16) {
        self.answers
            .lock()
            .unwrap()
            .insert(video_id.to_string(), (Err(status), Duration::ZERO));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataLookup for MockLookup {
    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.lock().unwrap().get(video_id).cloned();
        let Some((result, delay)) = answer else {
            return Err(LookupError::Status(404));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result.map_err(LookupError::Status)
    }
}

/// A store with one default tab, plus that tab's id.
pub fn store_with_one_tab() -> (StoreHandle, String) {
    let store = StoreHandle::default();
    let id = store.read(|s| s.active_tab_id().unwrap().to_string());
    (store, id)
}

pub fn tab_title(store: &StoreHandle, tab_id: &str) -> Option<String> {
    store.read(|s| s.get_tab(tab_id).map(|t| t.title.clone()))
}
