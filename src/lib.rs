//! YTDesktop: tab and navigation coordination for a single-site video
//! browser shell.
//!
//! The library holds the tab store and its persistence, the title resolver,
//! the navigation bridge and the per-tab content view controllers. Rendering
//! is delegated to a host-provided content surface, either in-process or
//! driven over the RPC channel by the host (`view::remote_surface`).

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
pub mod view;
