//! Title Resolver.
//!
//! Turns a tab's current URL into a display title (and thumbnail, for
//! videos). Video pages are resolved through the metadata lookup because
//! their in-page titles are decorated and settle late; everything else, and
//! every failed lookup, falls back to the document title of the content view.
//!
//! Each accepted invocation is tagged with a generation number. A result is
//! applied only if no newer invocation started while it was in flight, so a
//! slow lookup for an earlier URL can never overwrite a newer title.

use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::managers::tab_store::StoreHandle;
use crate::services::oembed_client::MetadataLookup;
use crate::services::video_id::extract_video_id;
use crate::types::tab::{TabPatch, BLANK_URL};
use crate::types::video::VideoInfo;

/// Anything that can report the title of the document it is showing.
pub trait DocumentTitleSource: Send + Sync {
    /// `None` when the title cannot be read (not ready, script failure).
    fn document_title(&self) -> impl Future<Output = Option<String>> + Send;
}

/// Where an applied title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    OEmbed,
    Document,
}

/// Outcome of one [`TitleResolver::resolve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Empty, blank, or the same URL as last time.
    Skipped,
    /// A title was written to the tab.
    Applied(TitleSource),
    /// A newer invocation superseded this one before it finished.
    Stale,
    /// Nothing usable was found; the tab keeps its previous title.
    Unchanged,
}

#[derive(Default)]
struct UrlFence {
    last_url: String,
    generation: u64,
}

/// Per-tab title resolver. Clones share the same debounce state.
pub struct TitleResolver<L: MetadataLookup> {
    tab_id: String,
    store: StoreHandle,
    lookup: Arc<L>,
    fence: Arc<Mutex<UrlFence>>,
}

impl<L: MetadataLookup> Clone for TitleResolver<L> {
    fn clone(&self) -> Self {
        Self {
            tab_id: self.tab_id.clone(),
            store: self.store.clone(),
            lookup: Arc::clone(&self.lookup),
            fence: Arc::clone(&self.fence),
        }
    }
}

impl<L: MetadataLookup> TitleResolver<L> {
    pub fn new(tab_id: &str, store: StoreHandle, lookup: Arc<L>) -> Self {
        Self {
            tab_id: tab_id.to_string(),
            store,
            lookup,
            fence: Arc::new(Mutex::new(UrlFence::default())),
        }
    }

    /// The last URL accepted for resolution.
    pub fn last_url(&self) -> String {
        self.fence
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_url
            .clone()
    }

    /// Forgets the last URL so the next call resolves even if it repeats.
    pub fn reset_url_tracking(&self) {
        let mut fence = self.fence.lock().unwrap_or_else(|e| e.into_inner());
        fence.last_url.clear();
        fence.generation += 1;
    }

    fn begin(&self, url: &str) -> Option<u64> {
        let mut fence = self.fence.lock().unwrap_or_else(|e| e.into_inner());
        if url == fence.last_url {
            return None;
        }
        fence.last_url = url.to_string();
        fence.generation += 1;
        Some(fence.generation)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.fence
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .generation
            == generation
    }

    /// Resolves a title for `url` and writes it to the tab.
    ///
    /// `document` is consulted only when the metadata path yields nothing;
    /// pass `None` while the content view is not ready.
    pub async fn resolve<D: DocumentTitleSource>(&self, url: &str, document: Option<&D>) -> Resolution {
        if url.is_empty() || url == BLANK_URL {
            return Resolution::Skipped;
        }
        let Some(generation) = self.begin(url) else {
            return Resolution::Skipped;
        };

        if let Some(info) = lookup_video_info(self.lookup.as_ref(), url).await {
            if !self.is_current(generation) {
                return Resolution::Stale;
            }
            log::info!("Title from oEmbed: {:?}", info.title);
            self.store.update_tab(
                &self.tab_id,
                TabPatch {
                    title: info.title,
                    url: Some(url.to_string()),
                    thumbnail: Some(info.thumbnail),
                    ..TabPatch::default()
                },
            );
            return Resolution::Applied(TitleSource::OEmbed);
        }

        let Some(document) = document else {
            return Resolution::Unchanged;
        };
        let title = match document.document_title().await {
            Some(t) if !t.trim().is_empty() && t != BLANK_URL => t,
            _ => return Resolution::Unchanged,
        };
        if !self.is_current(generation) {
            return Resolution::Stale;
        }
        log::info!("Title from document: {}", title);
        self.store.update_tab(
            &self.tab_id,
            TabPatch {
                title: Some(title),
                url: Some(url.to_string()),
                ..TabPatch::default()
            },
        );
        Resolution::Applied(TitleSource::Document)
    }
}

/// Looks up metadata for a video URL. Returns `None` for non-video URLs and
/// for lookups that fail or carry no title; failures are logged, not raised.
pub async fn lookup_video_info<L: MetadataLookup>(lookup: &L, url: &str) -> Option<VideoInfo> {
    let video_id = extract_video_id(url)?;
    match lookup.fetch_video_info(&video_id).await {
        Ok(info) if info.title.as_deref().is_some_and(|t| !t.trim().is_empty()) => Some(info),
        Ok(_) => None,
        Err(e) => {
            log::warn!("oEmbed failed for {}: {}", video_id, e);
            None
        }
    }
}
