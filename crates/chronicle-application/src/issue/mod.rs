//! Issue generation: the board, per-panel workflows and the orchestrator.

mod board;
mod orchestrator;
mod panel_workflow;

pub use board::{IssueBoard, IssueSnapshot};
pub use orchestrator::{IssueOrchestrator, IssueReport, StartupAction};
pub use panel_workflow::{PanelOutcome, PanelReport, PanelWorkflow};
