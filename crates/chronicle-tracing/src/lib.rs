//! Logging bootstrap for Chronicle hosts.
//!
//! ```no_run
//! use chronicle_tracing::{LogFormat, TracingOptions, init_tracing};
//!
//! let events = init_tracing(TracingOptions {
//!     format: LogFormat::Json,
//!     forward_events: true,
//!     ..Default::default()
//! })?;
//! # Ok::<(), chronicle_tracing::TracingError>(())
//! ```

pub mod event_layer;

pub use event_layer::{GenerationEvent, GenerationEventLayer};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `RUST_LOG` nor an explicit directive is given.
pub const DEFAULT_FILTER: &str = "chronicle=info";

#[derive(Error, Debug)]
pub enum TracingError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct TracingOptions {
    /// Filter directive; falls back to `RUST_LOG`, then [`DEFAULT_FILTER`].
    pub filter: Option<String>,
    pub format: LogFormat,
    /// Also stream chronicle events to the returned receiver.
    pub forward_events: bool,
}

/// Builds the filter for `directive`, or from the environment.
pub fn build_filter(directive: Option<&str>) -> Result<EnvFilter, TracingError> {
    match directive {
        Some(directive) => {
            EnvFilter::try_new(directive).map_err(|err| TracingError::InvalidFilter {
                directive: directive.to_string(),
                message: err.to_string(),
            })
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber.
///
/// Returns the event receiver when `forward_events` is set.
pub fn init_tracing(
    options: TracingOptions,
) -> Result<Option<mpsc::UnboundedReceiver<GenerationEvent>>, TracingError> {
    let filter = build_filter(options.filter.as_deref())?;

    let (event_layer, receiver) = if options.forward_events {
        let (layer, receiver) = GenerationEventLayer::channel();
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    let result = match options.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .with(event_layer)
            .try_init(),
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(event_layer)
            .try_init(),
    };
    result.map_err(|err| TracingError::AlreadyInitialized(err.to_string()))?;

    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter_is_validated() {
        assert!(build_filter(Some("chronicle_application=debug,warn")).is_ok());

        let err = build_filter(Some("chronicle=loud")).unwrap_err();
        assert!(matches!(err, TracingError::InvalidFilter { .. }));
    }

    #[test]
    fn test_default_options() {
        let options = TracingOptions::default();
        assert_eq!(options.format, LogFormat::Human);
        assert!(!options.forward_events);
        assert!(options.filter.is_none());
    }
}
