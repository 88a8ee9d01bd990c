//! Weekly cache on top of a raw key/value storage.

use chronicle_core::cache::{CacheEntry, KeyValueStorage};
use chronicle_core::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Stores payloads tagged with the issue window they were written in.
///
/// Reads under any other window behave like a miss; stale entries are never
/// evicted, they are simply overwritten by the next `put`. Corrupted payloads
/// and unreadable storage are also reported as a miss.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Writes `payload` under `key` for the window `window_id`.
    pub async fn put<T: Serialize>(&self, key: &str, window_id: &str, payload: &T) -> Result<()> {
        let entry = CacheEntry::new(window_id, payload);
        let text = serde_json::to_string(&entry)?;
        self.storage.set_item(key, text).await?;
        tracing::debug!(key, window_id, "Cached payload");
        Ok(())
    }

    /// Reads the payload under `key` if it was written in `current_window_id`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, current_window_id: &str) -> Option<T> {
        let stored = match self.storage.get_item(key).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key, "Failed to read cache storage: {}", err);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&stored) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(key, "Failed to parse cached data: {}", err);
                return None;
            }
        };

        if entry.is_valid_for(current_window_id) {
            Some(entry.data)
        } else {
            tracing::debug!(
                key,
                stored_window = %entry.window_id,
                current_window = current_window_id,
                "Cached payload belongs to another issue window"
            );
            None
        }
    }
}
