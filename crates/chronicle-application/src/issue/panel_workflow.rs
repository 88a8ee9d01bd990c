//! Generation workflow of a single panel.
//!
//! ```text
//! placeholder ─▶ script ──┬─▶ image ──┬─▶ Ready
//!                         │           └─▶ ImageMissing
//!                         └─▶ Failed
//! ```
//!
//! The image step never starts before the script resolves because the image
//! directive comes from the script.

use chronicle_core::clock::{Clock, display_date};
use chronicle_core::comic::{Category, Panel};
use chronicle_core::generation::GenerationClient;
use serde::Serialize;
use std::sync::Arc;

use super::board::IssueBoard;

/// Terminal state of one panel workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelOutcome {
    Ready,
    ImageMissing,
    ScriptFailed,
    /// A newer issue replaced the board before this workflow finished.
    Superseded,
}

/// Result of one panel workflow, tagged with the panel identity it owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelReport {
    pub panel_id: String,
    pub category: Category,
    pub outcome: PanelOutcome,
}

/// Runs the script → image sequence for one category.
#[derive(Clone)]
pub struct PanelWorkflow {
    client: Arc<dyn GenerationClient>,
    board: Arc<IssueBoard>,
    clock: Arc<dyn Clock>,
}

impl PanelWorkflow {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        board: Arc<IssueBoard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            board,
            clock,
        }
    }

    /// Publishes a placeholder for `category` into issue `epoch` and fills it in.
    ///
    /// Every merge targets the placeholder's identity within `epoch`; once a
    /// newer issue has started, remaining steps are skipped.
    pub async fn run(&self, epoch: u64, category: Category) -> PanelReport {
        let placeholder = Panel::placeholder(category, display_date(self.clock.now()));
        let panel_id = placeholder.id.clone();
        let report = |outcome| PanelReport {
            panel_id: panel_id.clone(),
            category,
            outcome,
        };

        if !self.board.insert(epoch, placeholder).await {
            return report(PanelOutcome::Superseded);
        }

        tracing::info!(%category, panel_id = %panel_id, "Generating panel script");

        let script = match self.client.generate_panel_script(category).await {
            Ok(script) => script,
            Err(err) => {
                tracing::error!(%category, panel_id = %panel_id, "Failed to generate panel script: {}", err);
                let merged = self
                    .board
                    .update_in_epoch(epoch, &panel_id, Panel::mark_failed)
                    .await;
                return report(if merged {
                    PanelOutcome::ScriptFailed
                } else {
                    PanelOutcome::Superseded
                });
            }
        };

        let directive = script.directive.clone();
        if !self
            .board
            .update_in_epoch(epoch, &panel_id, |panel| panel.apply_script(script))
            .await
        {
            return report(PanelOutcome::Superseded);
        }

        let image = self.client.generate_panel_image(&directive).await;
        let outcome = if image.is_some() {
            PanelOutcome::Ready
        } else {
            tracing::warn!(%category, panel_id = %panel_id, "Panel image missing");
            PanelOutcome::ImageMissing
        };

        if !self
            .board
            .update_in_epoch(epoch, &panel_id, |panel| panel.apply_image(image))
            .await
        {
            return report(PanelOutcome::Superseded);
        }

        tracing::info!(%category, panel_id = %panel_id, ?outcome, "Panel settled");
        report(outcome)
    }
}
