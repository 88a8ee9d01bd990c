//! Secret service implementation.
//!
//! Resolves the Gemini API key from the environment or from `secret.json`.

use async_trait::async_trait;
use chronicle_core::config::SecretConfig;
use chronicle_core::credential::CredentialProvider;
use chronicle_core::error::Result;
use std::path::PathBuf;

/// Environment variables checked before the secret file, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Credential provider backed by environment variables and `secret.json`.
///
/// Nothing is cached: a key added while the application runs is picked up by
/// the next availability check.
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    secret_file: PathBuf,
    env_vars: Vec<String>,
}

impl SecretServiceImpl {
    pub fn new(secret_file: impl Into<PathBuf>) -> Self {
        Self {
            secret_file: secret_file.into(),
            env_vars: API_KEY_ENV_VARS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Overrides the environment variables that are consulted.
    pub fn with_env_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Loads `secret.json`. A missing file is an empty config.
    pub async fn load_secrets(&self) -> Result<SecretConfig> {
        let content = match tokio::fs::read_to_string(&self.secret_file).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SecretConfig::default());
            }
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn key_from_env(&self) -> Option<String> {
        self.env_vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }
}

#[async_trait]
impl CredentialProvider for SecretServiceImpl {
    async fn api_key(&self) -> Option<String> {
        if let Some(key) = self.key_from_env() {
            return Some(key);
        }

        match self.load_secrets().await {
            Ok(config) => config
                .gemini
                .map(|gemini| gemini.api_key)
                .filter(|key| !key.trim().is_empty()),
            Err(err) => {
                // Error messages from parsing never contain the key itself
                tracing::warn!(
                    path = %self.secret_file.display(),
                    "Failed to read secret file: {}",
                    err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNSET_VAR: &str = "CHRONICLE_TEST_KEY_THAT_IS_NEVER_SET";

    fn service(dir: &TempDir) -> SecretServiceImpl {
        SecretServiceImpl::new(dir.path().join("secret.json")).with_env_vars([UNSET_VAR])
    }

    #[tokio::test]
    async fn test_missing_file_means_no_credential() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        assert_eq!(service.api_key().await, None);
        assert!(!service.is_available().await);
    }

    #[tokio::test]
    async fn test_reads_key_from_secret_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini": {"api_key": "test-key"}}"#,
        )
        .unwrap();

        let service = service(&temp_dir);
        assert_eq!(service.api_key().await, Some("test-key".to_string()));
        assert!(service.is_available().await);
    }

    #[tokio::test]
    async fn test_blank_key_is_not_available() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini": {"api_key": "  "}}"#,
        )
        .unwrap();

        assert!(!service(&temp_dir).is_available().await);
    }

    #[tokio::test]
    async fn test_unparseable_file_is_treated_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("secret.json"), "not json").unwrap();

        let service = service(&temp_dir);
        assert!(service.load_secrets().await.is_err());
        assert_eq!(service.api_key().await, None);
    }
}
