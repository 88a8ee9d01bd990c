//! Editor-in-chief chat.

use chronicle_core::chat::{ChatRole, ChatTurn};
use chronicle_core::clock::Clock;
use chronicle_core::credential::CredentialProvider;
use chronicle_core::generation::GenerationClient;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const GREETING: &str = "Hey! I'm the Editor-in-Chief here. Want the scoop on the latest comics or need me to explain a joke?";
pub const FAILURE_REPLY: &str = "Sorry, I spilled coffee on the server. Try again later.";
pub const BLANK_REPLY: &str = "I'm drawing a blank here...";

#[derive(Default)]
struct Conversation {
    turns: Vec<ChatTurn>,
    composing: bool,
}

/// Append-only conversation with the editor assistant.
pub struct ChatSession {
    client: Arc<dyn GenerationClient>,
    credentials: Arc<dyn CredentialProvider>,
    clock: Arc<dyn Clock>,
    conversation: RwLock<Conversation>,
}

impl ChatSession {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        credentials: Arc<dyn CredentialProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let greeting = ChatTurn::assistant(GREETING, clock.now());
        Self {
            client,
            credentials,
            clock,
            conversation: RwLock::new(Conversation {
                turns: vec![greeting],
                composing: false,
            }),
        }
    }

    pub async fn history(&self) -> Vec<ChatTurn> {
        self.conversation.read().await.turns.clone()
    }

    pub async fn is_composing(&self) -> bool {
        self.conversation.read().await.composing
    }

    /// Sends a reader message and appends the assistant's reply.
    ///
    /// Returns `None` without touching the history when the text is blank,
    /// no credential is available, or a reply is still being composed.
    /// Remote failures never surface; they become a fixed fallback turn.
    pub async fn send(&self, text: &str) -> Option<ChatTurn> {
        if text.trim().is_empty() {
            return None;
        }
        if !self.credentials.is_available().await {
            tracing::debug!("Ignoring chat message without credential");
            return None;
        }

        let prior = {
            let mut conversation = self.conversation.write().await;
            if conversation.composing {
                tracing::debug!("Ignoring chat message while a reply is in flight");
                return None;
            }
            let prior = conversation.turns.clone();
            conversation
                .turns
                .push(ChatTurn::user(text, self.clock.now()));
            conversation.composing = true;
            prior
        };

        let reply = match self.client.send_chat_turn(&prior, text).await {
            Ok(reply) if reply.trim().is_empty() => BLANK_REPLY.to_string(),
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("Chat turn failed: {}", err);
                FAILURE_REPLY.to_string()
            }
        };

        let turn = ChatTurn::new(ChatRole::Assistant, reply, self.clock.now());
        let mut conversation = self.conversation.write().await;
        conversation.turns.push(turn.clone());
        conversation.composing = false;
        Some(turn)
    }
}
