//! Weekly cover art.

use chronicle_core::cache::{HERO_COVER_KEY, current_window_id};
use chronicle_core::clock::Clock;
use chronicle_core::comic::ImageRef;
use chronicle_core::credential::CredentialProvider;
use chronicle_core::generation::GenerationClient;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache_store::CacheStore;

pub const COVER_FAILED_MESSAGE: &str = "Failed to generate cover art.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverState {
    pub image: Option<ImageRef>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once a cover was served from cache or a generation completed.
    pub loaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverOutcome {
    FromCache,
    Generated,
    /// The model answered without an image; the cover is cleared.
    NoImage,
    Failed,
    AwaitingCredential,
    AlreadyLoaded,
    Busy,
}

/// Serves this week's cover from the cache or generates a new one.
pub struct CoverArtService {
    client: Arc<dyn GenerationClient>,
    credentials: Arc<dyn CredentialProvider>,
    cache: CacheStore,
    clock: Arc<dyn Clock>,
    state: watch::Sender<CoverState>,
}

impl CoverArtService {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        credentials: Arc<dyn CredentialProvider>,
        cache: CacheStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(CoverState::default());
        Self {
            client,
            credentials,
            cache,
            clock,
            state,
        }
    }

    pub fn state(&self) -> CoverState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CoverState> {
        self.state.subscribe()
    }

    /// Shows the cached cover of the current week, generating one only when
    /// nothing is cached and no cover has been loaded yet.
    pub async fn load(&self) -> CoverOutcome {
        let window_id = current_window_id(self.clock.as_ref());
        if let Some(image) = self.cache.get::<ImageRef>(HERO_COVER_KEY, &window_id).await {
            tracing::debug!(window_id = %window_id, "Serving cover from cache");
            self.state.send_modify(|state| {
                state.image = Some(image);
                state.loaded = true;
            });
            return CoverOutcome::FromCache;
        }

        if self.state.borrow().loaded {
            return CoverOutcome::AlreadyLoaded;
        }
        self.generate().await
    }

    /// Forces a new cover regardless of the cache.
    pub async fn redraw(&self) -> CoverOutcome {
        self.generate().await
    }

    async fn generate(&self) -> CoverOutcome {
        if !self.credentials.is_available().await {
            return CoverOutcome::AwaitingCredential;
        }

        let started = self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            state.error = None;
            true
        });
        if !started {
            return CoverOutcome::Busy;
        }

        tracing::info!("Generating cover art");
        let outcome = match self.client.generate_cover_art().await {
            Ok(Some(image)) => {
                let window_id = current_window_id(self.clock.as_ref());
                if let Err(err) = self.cache.put(HERO_COVER_KEY, &window_id, &image).await {
                    tracing::warn!("Failed to cache cover art: {}", err);
                }
                self.state.send_modify(|state| {
                    state.image = Some(image);
                    state.loaded = true;
                });
                CoverOutcome::Generated
            }
            Ok(None) => {
                tracing::warn!("Cover art response carried no image");
                self.state.send_modify(|state| {
                    state.image = None;
                    state.loaded = true;
                });
                CoverOutcome::NoImage
            }
            Err(err) => {
                tracing::error!("Failed to generate cover art: {}", err);
                self.state
                    .send_modify(|state| state.error = Some(COVER_FAILED_MESSAGE.to_string()));
                CoverOutcome::Failed
            }
        };

        self.state.send_modify(|state| state.loading = false);
        outcome
    }
}
