//! Remote model adapters for Chronicle.
//!
//! [`GeminiApiClient`] implements the generation contract from
//! `chronicle-core` on top of the Gemini REST API.

pub mod gemini_api_client;
pub mod prompts;

pub use gemini_api_client::GeminiApiClient;
