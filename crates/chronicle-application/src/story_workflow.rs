//! On-demand strip expansion of a settled panel.
//!
//! A strip load runs in three steps: the strip script, one atomic attach of
//! every placeholder frame, then all frame images concurrently followed by a
//! single atomic update that settles the whole strip.

use chronicle_core::comic::{ImageRef, Panel, StripFrame};
use chronicle_core::generation::GenerationClient;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::issue::IssueBoard;

/// User-facing copy shown when the strip script could not be generated.
pub const STRIP_FAILED_MESSAGE: &str = "The printing press jammed while making the full strip.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoryError {
    #[error("Panel '{0}' not found")]
    NotFound(String),

    #[error("Panel '{0}' is still being generated")]
    PanelNotReady(String),

    #[error("Strip for panel '{0}' is already loading")]
    AlreadyLoading(String),

    #[error("The printing press jammed while making the full strip.")]
    ScriptFailed { panel_id: String, cause: String },
}

impl StoryError {
    /// Whether calling [`StoryWorkflow::retry`] can make progress.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoryError::ScriptFailed { .. })
    }
}

/// Strip state of one panel, separate from the panel's own stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoryState {
    #[default]
    Idle,
    Loading,
    Failed {
        message: String,
    },
    Loaded,
}

/// What a strip request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryOutcome {
    /// The panel already carried a strip; nothing was generated.
    AlreadyExpanded,
    /// A strip was generated; `images` of `frames` frames received an image.
    Expanded { frames: usize, images: usize },
}

pub struct StoryWorkflow {
    client: Arc<dyn GenerationClient>,
    board: Arc<IssueBoard>,
    states: Mutex<HashMap<String, StoryState>>,
}

impl StoryWorkflow {
    pub fn new(client: Arc<dyn GenerationClient>, board: Arc<IssueBoard>) -> Self {
        Self {
            client,
            board,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Strip state of `panel_id`; panels discarded by a newer issue are `Idle`.
    pub async fn state(&self, panel_id: &str) -> StoryState {
        let mut states = self.states.lock().await;
        self.prune_discarded(&mut states).await;
        states.get(panel_id).cloned().unwrap_or_default()
    }

    /// Expands the panel unless it already has a strip.
    pub async fn request(&self, panel_id: &str) -> Result<StoryOutcome, StoryError> {
        let panel = self.settled_panel(panel_id).await?;
        if panel.strip.is_some() {
            return Ok(StoryOutcome::AlreadyExpanded);
        }
        self.load(panel_id, &panel.title, &panel.body).await
    }

    /// Regenerates the strip from scratch, replacing any existing frames.
    pub async fn retry(&self, panel_id: &str) -> Result<StoryOutcome, StoryError> {
        let panel = self.settled_panel(panel_id).await?;
        self.load(panel_id, &panel.title, &panel.body).await
    }

    async fn settled_panel(&self, panel_id: &str) -> Result<Panel, StoryError> {
        let panel = self
            .board
            .panel(panel_id)
            .await
            .ok_or_else(|| StoryError::NotFound(panel_id.to_string()))?;
        if panel.is_loading() {
            return Err(StoryError::PanelNotReady(panel_id.to_string()));
        }
        Ok(panel)
    }

    async fn load(
        &self,
        panel_id: &str,
        title: &str,
        body: &str,
    ) -> Result<StoryOutcome, StoryError> {
        {
            let mut states = self.states.lock().await;
            self.prune_discarded(&mut states).await;
            if states.get(panel_id) == Some(&StoryState::Loading) {
                return Err(StoryError::AlreadyLoading(panel_id.to_string()));
            }
            states.insert(panel_id.to_string(), StoryState::Loading);
        }

        let result = self.expand(panel_id, title, body).await;

        let next = match &result {
            Ok(_) => Some(StoryState::Loaded),
            Err(StoryError::ScriptFailed { .. }) => Some(StoryState::Failed {
                message: STRIP_FAILED_MESSAGE.to_string(),
            }),
            Err(_) => None,
        };
        let mut states = self.states.lock().await;
        match next {
            Some(state) => states.insert(panel_id.to_string(), state),
            None => states.remove(panel_id),
        };
        result
    }

    /// Drops the state of every panel that is no longer on the board.
    async fn prune_discarded(&self, states: &mut HashMap<String, StoryState>) {
        if states.is_empty() {
            return;
        }
        let snapshot = self.board.snapshot().await;
        let before = states.len();
        states.retain(|id, _| snapshot.panel(id).is_some());
        if states.len() < before {
            tracing::debug!(
                dropped = before - states.len(),
                "Forgot strip state of discarded panels"
            );
        }
    }

    async fn expand(
        &self,
        panel_id: &str,
        title: &str,
        body: &str,
    ) -> Result<StoryOutcome, StoryError> {
        tracing::info!(panel_id, "Generating strip script");
        let scripts = self
            .client
            .generate_strip_script(title, body)
            .await
            .map_err(|err| {
                tracing::error!(panel_id, "Failed to generate strip script: {}", err);
                StoryError::ScriptFailed {
                    panel_id: panel_id.to_string(),
                    cause: err.to_string(),
                }
            })?;

        let frames: Vec<StripFrame> = scripts
            .iter()
            .enumerate()
            .map(|(position, script)| StripFrame::placeholder(panel_id, position, script))
            .collect();
        let directives: Vec<String> = frames.iter().map(|f| f.directive.clone()).collect();

        if !self
            .board
            .update(panel_id, |panel| panel.strip = Some(frames))
            .await
        {
            return Err(StoryError::NotFound(panel_id.to_string()));
        }
        tracing::debug!(panel_id, frames = directives.len(), "Attached strip placeholders");

        let images: Vec<Option<ImageRef>> = join_all(
            directives
                .iter()
                .map(|directive| self.client.generate_panel_image(directive)),
        )
        .await;
        let resolved = images.iter().filter(|image| image.is_some()).count();

        let settled = self
            .board
            .update(panel_id, |panel| {
                if let Some(strip) = panel.strip.as_mut() {
                    for (frame, image) in strip.iter_mut().zip(images) {
                        frame.image = image;
                        frame.loading = false;
                    }
                }
            })
            .await;
        if !settled {
            return Err(StoryError::NotFound(panel_id.to_string()));
        }

        if resolved < directives.len() {
            tracing::warn!(
                panel_id,
                missing = directives.len() - resolved,
                "Some strip frames have no image"
            );
        }
        tracing::info!(panel_id, frames = directives.len(), "Strip settled");

        Ok(StoryOutcome::Expanded {
            frames: directives.len(),
            images: resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_failure_carries_fixed_copy() {
        let err = StoryError::ScriptFailed {
            panel_id: "p1".to_string(),
            cause: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), STRIP_FAILED_MESSAGE);
        assert!(err.is_retryable());
        assert!(!StoryError::AlreadyLoading("p1".to_string()).is_retryable());
    }

    #[test]
    fn test_story_state_serialization() {
        let json = serde_json::to_value(StoryState::Failed {
            message: STRIP_FAILED_MESSAGE.to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], STRIP_FAILED_MESSAGE);
        assert_eq!(StoryState::default(), StoryState::Idle);
    }
}
