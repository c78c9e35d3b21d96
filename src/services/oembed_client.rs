//! oEmbed metadata lookup.
//!
//! Resolves a video id to its title and thumbnail without loading the page.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::types::errors::LookupError;
use crate::types::settings::OEmbedSettings;
use crate::types::video::{OEmbedResponse, VideoInfo};

/// Trait defining the remote metadata lookup.
pub trait MetadataLookup: Send + Sync + 'static {
    fn fetch_video_info(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<VideoInfo, LookupError>> + Send;
}

/// HTTP client for an oEmbed endpoint.
pub struct OEmbedClient {
    client: reqwest::Client,
    endpoint: String,
    watch_url_base: String,
}

impl OEmbedClient {
    pub fn new(settings: &OEmbedSettings) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            watch_url_base: settings.watch_url_base.clone(),
        })
    }

    /// `{endpoint}?url={watch_url_base}{id}&format=json`, query-encoded.
    pub fn request_url(&self, video_id: &str) -> Result<Url, LookupError> {
        let watch_url = format!("{}{}", self.watch_url_base, video_id);
        Url::parse_with_params(
            &self.endpoint,
            &[("url", watch_url.as_str()), ("format", "json")],
        )
        .map_err(|e| LookupError::InvalidRequest(e.to_string()))
    }
}

impl MetadataLookup for OEmbedClient {
    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo, LookupError> {
        let url = self.request_url(video_id)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("oEmbed request failed with status {}", status.as_u16());
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: OEmbedResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;
        let info = VideoInfo::from(body);
        log::info!("oEmbed fetched title {:?}", info.title);
        Ok(info)
    }
}
