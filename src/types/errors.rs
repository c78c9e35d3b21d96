use std::fmt;

// === StorageError ===

/// Errors related to durable key-value persistence.
#[derive(Debug)]
pub enum StorageError {
    /// Database operation failed.
    Database(String),
    /// Failed to serialize or deserialize a stored value.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Database(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::Serialization(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === LookupError ===

/// Errors related to remote video metadata lookups.
#[derive(Debug)]
pub enum LookupError {
    /// The request could not be sent or the connection failed.
    Network(String),
    /// The endpoint answered with a non-success status code.
    Status(u16),
    /// The response body could not be parsed.
    Parse(String),
    /// The request URL could not be built.
    InvalidRequest(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Network(msg) => write!(f, "Lookup network error: {}", msg),
            LookupError::Status(code) => write!(f, "Lookup failed with status {}", code),
            LookupError::Parse(msg) => write!(f, "Lookup parse error: {}", msg),
            LookupError::InvalidRequest(msg) => write!(f, "Invalid lookup request: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

// === SurfaceError ===

/// Errors reported by an embedded content surface.
#[derive(Debug)]
pub enum SurfaceError {
    /// The surface has not finished its first load.
    NotReady,
    /// Script evaluation failed inside the page.
    Script(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::NotReady => write!(f, "Content surface is not ready"),
            SurfaceError::Script(msg) => write!(f, "Script evaluation failed: {}", msg),
        }
    }
}

impl std::error::Error for SurfaceError {}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug)]
pub enum ShortcutError {
    /// Shortcut for the given action was not found.
    NotFound(String),
    /// The shortcut keys conflict with an existing binding.
    Conflict(String),
    /// The provided key combination is invalid.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::NotFound(action) => {
                write!(f, "Shortcut not found for action: {}", action)
            }
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
