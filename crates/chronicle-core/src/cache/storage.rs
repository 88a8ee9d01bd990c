//! Raw key/value storage contract.

use async_trait::async_trait;

use crate::error::Result;

/// Text key/value storage scoped to one local installation.
///
/// Mirrors the semantics of browser local storage: values are opaque text
/// and nothing expires on its own.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns the stored text for `key`, or `None` if nothing is stored.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}
