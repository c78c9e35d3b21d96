// YTDesktop state managers
// Tab store, navigation signal bridge, session persistence and shortcuts.

pub mod navigation_bridge;
pub mod session_manager;
pub mod shortcut_manager;
pub mod tab_store;
