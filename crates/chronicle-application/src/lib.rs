//! Application layer for Chronicle.
//!
//! Orchestrates panel, strip, chat and cover generation on top of the
//! domain contracts, and keeps the weekly cache.

pub mod cache_store;
pub mod chat_session;
pub mod cover_art_service;
pub mod issue;
pub mod newsroom;
pub mod story_workflow;

pub use cache_store::CacheStore;
pub use chat_session::ChatSession;
pub use cover_art_service::{CoverArtService, CoverOutcome, CoverState};
pub use issue::{
    IssueBoard, IssueOrchestrator, IssueReport, IssueSnapshot, PanelOutcome, PanelReport,
    PanelWorkflow, StartupAction,
};
pub use newsroom::{CredentialCheck, Newsroom, bootstrap_newsroom};
pub use story_workflow::{StoryError, StoryOutcome, StoryState, StoryWorkflow};
