// macOS: config and data share ~/Library/Application Support/YTDesktop.

use std::env;
use std::path::PathBuf;

fn support_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join("YTDesktop")
}

pub fn get_config_dir() -> PathBuf {
    support_dir()
}

pub fn get_data_dir() -> PathBuf {
    support_dir()
}
