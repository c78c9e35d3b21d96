// YTDesktop services
// Storage backends, metadata lookup, title resolution, open routing and settings.

pub mod key_value_store;
pub mod oembed_client;
pub mod open_request;
pub mod settings_engine;
pub mod title_resolver;
pub mod video_id;
