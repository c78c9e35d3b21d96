// Content views
// Per-tab controllers bridging the tab store and the embedded content surface.

pub mod content_surface;
pub mod remote_surface;
pub mod view_controller;
pub mod view_host;
