//! Key-value persistence and on-disk locations.
//!
//! Everything pomotrack persists is a string value under a string key:
//! the session history (`intervalData`) and, for the CLI, the serialized
//! timer state (`timerState`). [`KeyValueStore`] is that contract; the
//! backends are an in-memory map and a SQLite `kv` table.

mod config;
pub mod database;
pub mod memory;

pub use config::{Config, DisplayConfig, LoggingConfig, StorageConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, StorageError};

/// Minimal string key-value store, shaped after browser local storage.
pub trait KeyValueStore {
    /// Returns `None` when the key has never been written.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// Returns the pomotrack data directory, creating it if needed.
///
/// `POMOTRACK_HOME` wins when set. Otherwise `~/.config/pomotrack/`, or
/// `~/.config/pomotrack-dev/` with `POMOTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOTRACK_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotrack-dev")
            } else {
                base_dir.join("pomotrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
