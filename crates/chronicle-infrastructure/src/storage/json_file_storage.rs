//! Key/value storage persisted as a single JSON object file.
//!
//! Writes go to a temporary file that is flushed to disk before it is
//! atomically renamed over the cache file.

use async_trait::async_trait;
use chronicle_core::cache::KeyValueStorage;
use chronicle_core::error::{ChronicleError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

type Items = BTreeMap<String, String>;

/// File-backed [`KeyValueStorage`].
///
/// All operations are serialized through one lock so concurrent writers
/// never lose each other's keys.
pub struct JsonFileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all items. A missing or empty file is an empty store.
    async fn read_items(&self) -> Result<Items> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Items::new()),
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(Items::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Reads all items, starting over if the file itself is unreadable JSON.
    async fn read_items_for_write(&self) -> Result<Items> {
        match self.read_items().await {
            Ok(items) => Ok(items),
            Err(ChronicleError::Serialization { message, .. }) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Cache file is corrupted, starting fresh: {}",
                    message
                );
                Ok(Items::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn write_items(&self, items: &Items) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(items)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
        tmp_file.write_all(json.as_bytes()).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for JsonFileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let items = self.read_items().await?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items_for_write().await?;
        items.insert(key.to_string(), value);
        self.write_items(&items).await?;
        tracing::debug!(key, path = %self.path.display(), "Stored cache item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items_for_write().await?;
        if items.remove(key).is_some() {
            self.write_items(&items).await?;
        }
        Ok(())
    }
}
