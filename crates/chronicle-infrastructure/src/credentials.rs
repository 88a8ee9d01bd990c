//! Host-driven credential sources.

use async_trait::async_trait;
use chronicle_core::credential::CredentialProvider;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A key chosen through the host's interactive selection flow.
///
/// Starts empty; the host calls [`SelectedCredential::select`] once the user
/// has picked a key.
#[derive(Default)]
pub struct SelectedCredential {
    key: RwLock<Option<String>>,
}

impl SelectedCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn select(&self, key: impl Into<String>) {
        *self.key.write().await = Some(key.into());
        tracing::info!("API key selected by host");
    }

    pub async fn clear(&self) {
        *self.key.write().await = None;
    }
}

#[async_trait]
impl CredentialProvider for SelectedCredential {
    async fn api_key(&self) -> Option<String> {
        self.key.read().await.clone()
    }
}

/// Tries several providers in order; the first available key wins.
pub struct ChainedCredentials {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    pub fn new(providers: Vec<Arc<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl CredentialProvider for ChainedCredentials {
    async fn api_key(&self) -> Option<String> {
        for provider in &self.providers {
            let key = provider.api_key().await;
            if key.as_ref().is_some_and(|key| !key.trim().is_empty()) {
                return key;
            }
        }
        None
    }
}
