// YTDesktop platform paths
// Where the settings file and the tab database live on each OS.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as native;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
use macos as native;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
use windows as native;

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    native::get_config_dir()
}

/// Directory holding the tab database.
pub fn get_data_dir() -> PathBuf {
    native::get_data_dir()
}

/// Default location of the persisted tab store.
pub fn default_database_path() -> PathBuf {
    get_data_dir().join("ytdesktop.db")
}
