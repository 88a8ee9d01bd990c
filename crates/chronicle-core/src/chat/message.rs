//! Conversation turn types.
//!
//! This module contains types for representing the turns of the newsroom
//! chat, including roles and turn content.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Turn typed by the reader.
    User,
    /// Turn written by the editor assistant.
    Assistant,
}

/// A single turn in the chat history.
///
/// Turns are append-only: once created they are never edited or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub created_at: DateTime<Local>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, text: impl Into<String>, created_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at,
        }
    }

    pub fn user(text: impl Into<String>, created_at: DateTime<Local>) -> Self {
        Self::new(ChatRole::User, text, created_at)
    }

    pub fn assistant(text: impl Into<String>, created_at: DateTime<Local>) -> Self {
        Self::new(ChatRole::Assistant, text, created_at)
    }
}
