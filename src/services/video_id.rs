//! Canonical video id extraction.
//!
//! Four URL shapes are tried in order and the first match wins:
//! `?v=ID` / `&v=ID`, `youtu.be/ID`, `shorts/ID`, `embed/ID`.

use std::sync::OnceLock;

use regex::Regex;

/// Video id patterns, in match priority order
static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();

/// Get the compiled video id patterns
fn patterns() -> &'static [Regex; 4] {
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"[?&]v=([^&]+)").expect("Failed to compile watch regex"),
            Regex::new(r"youtu\.be/([^?&]+)").expect("Failed to compile short link regex"),
            Regex::new(r"shorts/([^?&]+)").expect("Failed to compile shorts regex"),
            Regex::new(r"embed/([^?&]+)").expect("Failed to compile embed regex"),
        ]
    })
}

/// Returns the video id embedded in `url`, or `None` for non-video pages.
pub fn extract_video_id(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
