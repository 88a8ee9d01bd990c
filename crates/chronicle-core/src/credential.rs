//! Credential gate.
//!
//! The orchestration layer only asks whether generation is possible. The key
//! itself is read by the generation client, fresh for every request.

use async_trait::async_trait;

/// Source of the generation service API key.
///
/// # Security Note
///
/// Implementations must never log the key or include it in error messages.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the current API key, if one is configured.
    async fn api_key(&self) -> Option<String>;

    /// Returns `true` if generation can run.
    async fn is_available(&self) -> bool {
        self.api_key()
            .await
            .is_some_and(|key| !key.trim().is_empty())
    }
}
