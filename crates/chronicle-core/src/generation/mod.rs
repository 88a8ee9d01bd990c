//! Generation service contract.

mod client;

pub use client::GenerationClient;

/// Operation names used in errors and logs.
pub mod operation {
    pub const COVER_ART: &str = "cover_art";
    pub const PANEL_IMAGE: &str = "panel_image";
    pub const PANEL_SCRIPT: &str = "panel_script";
    pub const STRIP_SCRIPT: &str = "strip_script";
    pub const CHAT: &str = "chat";
}
