//! Configuration models.

use serde::{Deserialize, Serialize};

use crate::comic::Category;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Model identifiers per operation class.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    pub text: String,
    pub image: String,
    pub chat: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
            chat: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChronicleConfig {
    pub models: ModelConfig,
    pub api_base_url: String,
    /// Desks generated for every issue, in display order.
    pub categories: Vec<Category>,
    /// Restore this week's settled issue instead of generating on startup.
    pub restore_cached_issue: bool,
    pub request_timeout_secs: u64,
}

impl Default for ChronicleConfig {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            categories: Category::ALL.to_vec(),
            restore_cached_issue: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Root of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials.
#[derive(Deserialize, Serialize, Clone)]
pub struct GeminiSecret {
    pub api_key: String,
}

impl std::fmt::Debug for GeminiSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSecret")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
