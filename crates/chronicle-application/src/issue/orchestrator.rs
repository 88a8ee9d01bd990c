//! Issue orchestration.
//!
//! Fans out one [`PanelWorkflow`] per category, waits for all of them to
//! settle, and owns the one-shot latch that starts the first issue as soon
//! as a credential becomes available.

use chronicle_core::cache::{ISSUE_SNAPSHOT_KEY, current_window_id};
use chronicle_core::clock::Clock;
use chronicle_core::comic::{Category, Panel};
use chronicle_core::credential::CredentialProvider;
use chronicle_core::error::{ChronicleError, Result};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::board::IssueBoard;
use super::panel_workflow::{PanelOutcome, PanelReport, PanelWorkflow};
use crate::cache_store::CacheStore;

/// Summary of one `generate_issue` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub epoch: u64,
    /// One entry per category, in category order.
    pub outcomes: Vec<PanelReport>,
}

impl IssueReport {
    /// Panel identities created by this call that are still on the board.
    pub fn live_panel_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|report| report.outcome != PanelOutcome::Superseded)
            .map(|report| report.panel_id.as_str())
            .collect()
    }

    pub fn count(&self, outcome: PanelOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|report| report.outcome == outcome)
            .count()
    }
}

/// How the startup latch was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupAction {
    /// No credential yet; the latch is still armed.
    AwaitingCredential,
    /// The latch had already fired earlier.
    AlreadyStarted,
    /// This week's settled issue was restored from the cache.
    Restored { epoch: u64 },
    /// A fresh issue was generated.
    Generated(IssueReport),
}

/// Weekly persistence of settled issues.
struct IssueCache {
    store: CacheStore,
    clock: Arc<dyn Clock>,
}

/// Owns the current issue and coordinates its generation.
pub struct IssueOrchestrator {
    board: Arc<IssueBoard>,
    workflow: PanelWorkflow,
    categories: Vec<Category>,
    credentials: Arc<dyn CredentialProvider>,
    started: AtomicBool,
    selected: RwLock<Option<String>>,
    cache: Option<IssueCache>,
}

impl IssueOrchestrator {
    pub fn new(
        board: Arc<IssueBoard>,
        workflow: PanelWorkflow,
        categories: Vec<Category>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        // One panel per category; repeats keep their first position
        let mut seen = HashSet::new();
        let categories = categories
            .into_iter()
            .filter(|category| seen.insert(*category))
            .collect();
        Self {
            board,
            workflow,
            categories,
            credentials,
            started: AtomicBool::new(false),
            selected: RwLock::new(None),
            cache: None,
        }
    }

    /// Persists settled issues and restores them on startup.
    pub fn with_issue_cache(mut self, store: CacheStore, clock: Arc<dyn Clock>) -> Self {
        self.cache = Some(IssueCache { store, clock });
        self
    }

    pub fn board(&self) -> &Arc<IssueBoard> {
        &self.board
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Generates a fresh issue.
    ///
    /// The previous issue is discarded immediately, including any strips
    /// and the current selection. Workflows run concurrently and fail
    /// independently; the call returns once every one of them has settled.
    /// If another `generate_issue` starts meanwhile, this call's remaining
    /// results are dropped and it reports them as superseded.
    pub async fn generate_issue(&self) -> IssueReport {
        let epoch = self.board.begin_issue().await;
        *self.selected.write().await = None;

        tracing::info!(epoch, categories = self.categories.len(), "Generating issue");

        let workflows = self
            .categories
            .iter()
            .map(|&category| self.workflow.run(epoch, category));
        let outcomes = join_all(workflows).await;

        let report = IssueReport { epoch, outcomes };
        if self.board.finish_issue(epoch).await {
            tracing::info!(
                epoch,
                ready = report.count(PanelOutcome::Ready),
                image_missing = report.count(PanelOutcome::ImageMissing),
                failed = report.count(PanelOutcome::ScriptFailed),
                "Issue settled"
            );
            self.save_issue().await;
        } else {
            tracing::info!(epoch, "Issue superseded before it settled");
        }
        report
    }

    /// Starts the first issue exactly once, as soon as a credential exists.
    ///
    /// Safe to call on every credential check; only the first call that
    /// observes a credential consumes the latch.
    pub async fn start_if_ready(&self) -> StartupAction {
        if self.started.load(Ordering::Acquire) {
            return StartupAction::AlreadyStarted;
        }
        if !self.credentials.is_available().await {
            return StartupAction::AwaitingCredential;
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return StartupAction::AlreadyStarted;
        }

        if let Some(epoch) = self.restore_issue().await {
            return StartupAction::Restored { epoch };
        }
        StartupAction::Generated(self.generate_issue().await)
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Opens the detail view of a settled panel.
    pub async fn select_panel(&self, id: &str) -> Result<Panel> {
        let panel = self
            .board
            .panel(id)
            .await
            .ok_or_else(|| ChronicleError::not_found("Panel", id))?;
        if panel.is_loading() {
            return Err(ChronicleError::internal(format!(
                "Panel '{id}' is still being generated"
            )));
        }
        *self.selected.write().await = Some(id.to_string());
        Ok(panel)
    }

    /// Returns the selected panel, or `None` (list view) if nothing is
    /// selected or the selection no longer exists on the board.
    pub async fn selected_panel(&self) -> Option<Panel> {
        let selected = self.selected.read().await.clone()?;
        let panel = self.board.panel(&selected).await;
        if panel.is_none() {
            tracing::debug!(panel_id = %selected, "Selected panel is gone, falling back to list");
        }
        panel
    }

    pub async fn clear_selection(&self) {
        *self.selected.write().await = None;
    }

    async fn save_issue(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let panels = self.board.panels().await;
        let window_id = current_window_id(cache.clock.as_ref());
        if let Err(err) = cache.store.put(ISSUE_SNAPSHOT_KEY, &window_id, &panels).await {
            tracing::warn!("Failed to cache settled issue: {}", err);
        }
    }

    async fn restore_issue(&self) -> Option<u64> {
        let cache = self.cache.as_ref()?;
        let window_id = current_window_id(cache.clock.as_ref());
        let panels: Vec<Panel> = cache.store.get(ISSUE_SNAPSHOT_KEY, &window_id).await?;
        if panels.is_empty() || panels.iter().any(Panel::is_loading) {
            tracing::warn!("Ignoring cached issue that never settled");
            return None;
        }
        let epoch = self.board.restore(panels).await;
        tracing::info!(epoch, window_id = %window_id, "Restored cached issue");
        Some(epoch)
    }
}
