//! Loads `config.toml`.

use chronicle_core::config::ChronicleConfig;
use chronicle_core::error::{ChronicleError, Result};
use std::collections::HashSet;
use std::path::PathBuf;

/// Reads the application configuration from a TOML file.
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the configuration.
    ///
    /// A missing or empty file yields the defaults. A file that exists but
    /// does not parse is an error rather than being silently ignored.
    pub fn load(&self) -> Result<ChronicleConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(ChronicleConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ChronicleConfig::default());
        }

        let config: ChronicleConfig = toml::from_str(&content)?;
        if config.categories.is_empty() {
            return Err(ChronicleError::config(format!(
                "{} lists no categories",
                self.path.display()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(repeated) = config.categories.iter().find(|c| !seen.insert(**c)) {
            return Err(ChronicleError::config(format!(
                "{} lists category '{}' more than once",
                self.path.display(),
                repeated
            )));
        }

        Ok(config)
    }
}
