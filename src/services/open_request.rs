//! Open-in-new-tab routing.
//!
//! Requests to open a link in a new tab (middle click, `window.open`, link
//! context menu) land here. Each accepted request adds one background tab,
//! pre-titled from the metadata lookup when the link is a video. The same
//! URL arriving twice within the debounce window opens only one tab.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::managers::tab_store::{StoreHandle, TabStoreTrait};
use crate::services::oembed_client::MetadataLookup;
use crate::services::title_resolver::lookup_video_info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A background tab was added with this id.
    Opened(String),
    /// Same URL as a request accepted moments ago.
    Debounced,
    /// Not an http(s) URL.
    Rejected,
}

pub struct OpenRequestRouter<L: MetadataLookup> {
    store: StoreHandle,
    lookup: Arc<L>,
    debounce: Duration,
    last_open: Mutex<Option<(String, Instant)>>,
}

impl<L: MetadataLookup> OpenRequestRouter<L> {
    pub fn new(store: StoreHandle, lookup: Arc<L>, debounce: Duration) -> Self {
        Self {
            store,
            lookup,
            debounce,
            last_open: Mutex::new(None),
        }
    }

    fn is_duplicate(&self, url: &str) -> bool {
        let now = Instant::now();
        let mut last = self.last_open.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((prev, at)) = last.as_ref() {
            if prev == url && now.duration_since(*at) < self.debounce {
                return true;
            }
        }
        *last = Some((url.to_string(), now));
        false
    }

    /// Opens `url` in a new background tab. The active tab does not change.
    pub async fn open_in_background(&self, url: &str) -> OpenOutcome {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                log::warn!("Ignoring open request for unsupported URL: {}", url);
                return OpenOutcome::Rejected;
            }
        }
        if self.is_duplicate(url) {
            log::debug!("Debounced duplicate open request: {}", url);
            return OpenOutcome::Debounced;
        }

        let info = lookup_video_info(self.lookup.as_ref(), url).await;
        let title = info.as_ref().and_then(|i| i.title.clone());
        let thumbnail = info.as_ref().and_then(|i| i.thumbnail.clone());

        let id = self.store.write(|s| {
            s.add_tab(Some(url), false, title.as_deref(), thumbnail.as_deref())
        });
        log::info!("Opened background tab {} for {}", id, url);
        OpenOutcome::Opened(id)
    }
}
