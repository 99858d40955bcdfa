//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keys and swipes mapped to game commands)
//! - Storage (LocalStorage on web, no-op natively)

pub mod input;
pub mod storage;

pub use input::{SwipeTracker, command_for_key};
pub use storage::{StorageError, load_json, save_json};
