//! Unified path management for chronicle files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chronicle/         # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! └── cache.json               # Weekly cache (cover art, last issue)
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "chronicle";

/// Resolves the files chronicle reads and writes.
///
/// A base directory can be injected (tests, portable installs); otherwise
/// the platform config directory is used.
#[derive(Debug, Clone)]
pub struct ChroniclePaths {
    base: PathBuf,
}

impl ChroniclePaths {
    /// Uses the platform config directory (e.g. `~/.config/chronicle/`).
    pub fn from_platform() -> Result<Self, PathError> {
        let config = dirs::config_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(Self {
            base: config.join(APP_DIR),
        })
    }

    /// Uses `base` as the chronicle directory.
    pub fn with_base(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.base.join("cache.json")
    }
}
