//! Contract of the remote generation service.

use async_trait::async_trait;

use crate::chat::ChatTurn;
use crate::comic::{Category, FrameScript, ImageRef, PanelScript};
use crate::error::Result;

/// Request/response boundary to the generative model.
///
/// Every operation is a single round trip with no client-side retry. The
/// failure contract is deliberately asymmetric: images degrade to `None`,
/// scripts and chat replies fail loudly and leave recovery to the caller.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generates the wide cover art of the issue.
    ///
    /// Returns an error if the call fails or no credential is configured.
    async fn generate_cover_art(&self) -> Result<Option<ImageRef>>;

    /// Generates a square panel illustration from a directive.
    ///
    /// Never fails: any error is logged and reported as `None`.
    async fn generate_panel_image(&self, directive: &str) -> Option<ImageRef>;

    /// Writes the headline, body, directive and resources for a desk.
    async fn generate_panel_script(&self, category: Category) -> Result<PanelScript>;

    /// Extends a headline into an ordered multi-frame strip script.
    async fn generate_strip_script(&self, title: &str, body: &str) -> Result<Vec<FrameScript>>;

    /// Sends one chat message with the turns that came before it.
    async fn send_chat_turn(&self, history: &[ChatTurn], text: &str) -> Result<String>;
}
