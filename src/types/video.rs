use serde::{Deserialize, Serialize};

/// Raw oEmbed response body. Only `title` and `thumbnail_url` are consumed;
/// every field is optional so partial bodies still parse.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OEmbedResponse {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub version: Option<String>,
    pub provider_name: Option<String>,
    pub provider_url: Option<String>,
    pub thumbnail_height: Option<u32>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub html: Option<String>,
}

/// Metadata extracted from an oEmbed lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<OEmbedResponse> for VideoInfo {
    fn from(resp: OEmbedResponse) -> Self {
        Self {
            title: resp.title.filter(|t| !t.trim().is_empty()),
            thumbnail: resp.thumbnail_url.filter(|t| !t.is_empty()),
        }
    }
}
