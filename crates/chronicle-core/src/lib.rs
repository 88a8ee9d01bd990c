//! Domain layer for Chronicle.
//!
//! Holds the comic, chat and cache models, the shared error type, and the
//! contracts (generation client, key/value storage, credentials, clock) the
//! other crates implement.

pub mod cache;
pub mod chat;
pub mod clock;
pub mod comic;
pub mod config;
pub mod credential;
pub mod error;
pub mod generation;

// Re-export common error type
pub use error::{ChronicleError, Result};
