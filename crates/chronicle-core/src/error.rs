//! Error types for the Chronicle workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Chronicle workspace.
///
/// Variants are structured so a host UI can decide how to present them:
/// script failures end a panel or strip attempt, while image and chat
/// failures are normally absorbed before they ever become an error value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChronicleError {
    /// No credential is configured for the generation service.
    #[error("API key is missing. Please select an API key to open the newsroom.")]
    MissingCredential,

    /// The remote call failed (transport, HTTP status, or unreadable body).
    #[error("Generation failed during {operation}: {message}")]
    Generation {
        operation: &'static str,
        message: String,
    },

    /// The remote call succeeded but returned nothing usable.
    #[error("Generation returned an empty response during {operation}")]
    EmptyResponse { operation: &'static str },

    /// A script response could not be parsed into the expected shape.
    #[error("Malformed script from {operation}: {message}")]
    MalformedScript {
        operation: &'static str,
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChronicleError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Generation error
    pub fn generation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Generation {
            operation,
            message: message.into(),
        }
    }

    /// Creates a MalformedScript error
    pub fn malformed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedScript {
            operation,
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a missing credential error
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }

    /// Check if this error came from a script that could not be used.
    ///
    /// Returns true for empty responses and malformed payloads, the two
    /// outcomes that leave a panel with nothing to show.
    pub fn is_script_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptyResponse { .. } | Self::MalformedScript { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChronicleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChronicleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChronicleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ChronicleError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ChronicleError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ChronicleError>`.
pub type Result<T> = std::result::Result<T, ChronicleError>;
