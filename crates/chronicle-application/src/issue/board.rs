//! Authoritative state of the current issue.
//!
//! `IssueBoard` owns the ordered panel collection and the aggregate
//! "generating" flag. Every mutation is a closure applied to the current
//! state under a single write lock, so concurrent workflow completions never
//! overwrite each other, and every mutation publishes a fresh snapshot.
//!
//! Panels are held behind `Arc`, so a snapshot shares every panel with the
//! board and an update copies only the panel it touches.

use chronicle_core::comic::Panel;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

/// Point-in-time view of the issue, published to consumers on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSnapshot {
    /// Incremented by every issue generation.
    pub epoch: u64,
    pub panels: Vec<Arc<Panel>>,
    pub generating: bool,
}

impl IssueSnapshot {
    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels
            .iter()
            .find(|panel| panel.id == id)
            .map(Arc::as_ref)
    }
}

#[derive(Default)]
struct BoardState {
    epoch: u64,
    panels: Vec<Arc<Panel>>,
    generating: bool,
}

impl BoardState {
    fn snapshot(&self) -> IssueSnapshot {
        IssueSnapshot {
            epoch: self.epoch,
            panels: self.panels.clone(),
            generating: self.generating,
        }
    }

    /// Copies the panel first if a published snapshot still shares it.
    fn panel_mut(&mut self, id: &str) -> Option<&mut Panel> {
        self.panels
            .iter_mut()
            .find(|panel| panel.id == id)
            .map(Arc::make_mut)
    }
}

/// State container for the panels of the current issue.
pub struct IssueBoard {
    state: RwLock<BoardState>,
    updates: watch::Sender<IssueSnapshot>,
}

impl IssueBoard {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(IssueSnapshot::default());
        Self {
            state: RwLock::new(BoardState::default()),
            updates,
        }
    }

    /// Subscribes to snapshots. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<IssueSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> IssueSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn panels(&self) -> Vec<Panel> {
        let state = self.state.read().await;
        state.panels.iter().map(|panel| Panel::clone(panel)).collect()
    }

    pub async fn panel(&self, id: &str) -> Option<Panel> {
        let state = self.state.read().await;
        state
            .panels
            .iter()
            .find(|panel| panel.id == id)
            .map(|panel| Panel::clone(panel))
    }

    pub async fn epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    pub async fn is_generating(&self) -> bool {
        self.state.read().await.generating
    }

    /// Starts a new issue: discards every panel, raises `generating`, and
    /// returns the new epoch that workflows of this issue must carry.
    pub async fn begin_issue(&self) -> u64 {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.panels.clear();
        state.generating = true;
        tracing::debug!(epoch = state.epoch, "Issue board cleared for new issue");
        self.publish(&state);
        state.epoch
    }

    /// Clears `generating` if `epoch` is still the current issue.
    ///
    /// Returns `false` when a newer issue has started in the meantime; its own
    /// completion is then responsible for the flag.
    pub async fn finish_issue(&self, epoch: u64) -> bool {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(
                epoch,
                current = state.epoch,
                "Ignoring completion of a superseded issue"
            );
            return false;
        }
        state.generating = false;
        self.publish(&state);
        true
    }

    /// Replaces the whole collection with settled panels (cache restore).
    pub async fn restore(&self, panels: Vec<Panel>) -> u64 {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.panels = panels.into_iter().map(Arc::new).collect();
        state.generating = false;
        self.publish(&state);
        state.epoch
    }

    /// Appends a panel to the issue `epoch`. Dropped if the epoch is stale.
    pub async fn insert(&self, epoch: u64, panel: Panel) -> bool {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, panel_id = %panel.id, "Dropping placeholder of a superseded issue");
            return false;
        }
        if state.panels.iter().any(|existing| existing.id == panel.id) {
            tracing::warn!(panel_id = %panel.id, "Panel already on the board");
            return false;
        }
        state.panels.push(Arc::new(panel));
        self.publish(&state);
        true
    }

    /// Applies `update` to panel `id` if it belongs to the current issue `epoch`.
    ///
    /// Stale epochs and unknown identities are dropped silently; both mean the
    /// issue the update was produced for is gone.
    pub async fn update_in_epoch<F>(&self, epoch: u64, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut Panel),
    {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, panel_id = id, "Dropping update for a superseded issue");
            return false;
        }
        self.apply(&mut state, id, update)
    }

    /// Applies `update` to panel `id` in whatever issue is current.
    pub async fn update(&self, id: &str, update: impl FnOnce(&mut Panel)) -> bool {
        let mut state = self.state.write().await;
        self.apply(&mut state, id, update)
    }

    fn apply(&self, state: &mut BoardState, id: &str, update: impl FnOnce(&mut Panel)) -> bool {
        let Some(panel) = state.panel_mut(id) else {
            tracing::debug!(panel_id = id, "Dropping update for a panel no longer on the board");
            return false;
        };
        update(panel);
        self.publish(state);
        true
    }

    fn publish(&self, state: &BoardState) {
        self.updates.send_replace(state.snapshot());
    }
}

impl Default for IssueBoard {
    fn default() -> Self {
        Self::new()
    }
}
