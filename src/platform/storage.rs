//! LocalStorage-backed JSON persistence
//!
//! Natively these are stubs: loads find nothing and saves succeed without
//! writing anywhere.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Why a value could not be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No window or LocalStorage (private mode, sandboxed iframe)
    Unavailable,
    /// Value could not be encoded
    Encode(String),
    /// The browser refused the write (quota, permissions)
    Rejected,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "local storage unavailable"),
            StorageError::Encode(e) => write!(f, "failed to encode value: {e}"),
            StorageError::Rejected => write!(f, "local storage rejected the write"),
        }
    }
}

impl std::error::Error for StorageError {}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(StorageError::Unavailable)
}

/// Load and decode a value; `None` when missing, unreadable or malformed
#[cfg(target_arch = "wasm32")]
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let storage = local_storage().ok()?;
    let json = storage.get_item(key).ok()??;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed {key}: {e}");
            None
        }
    }
}

/// Encode and store a value
#[cfg(target_arch = "wasm32")]
pub fn save_json<T: Serialize>(key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::Encode(e.to_string()))?;
    local_storage()?
        .set_item(key, &json)
        .map_err(|_| StorageError::Rejected)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_json<T: DeserializeOwned>(_key: &str) -> Option<T> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_json<T: Serialize>(_key: &str, value: &T) -> Result<(), StorageError> {
    // Still validate that the value encodes
    serde_json::to_string(value)
        .map(|_| ())
        .map_err(|e| StorageError::Encode(e.to_string()))
}
