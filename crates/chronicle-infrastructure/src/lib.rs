//! Storage, configuration and credential adapters for Chronicle.

pub mod config_service;
pub mod credentials;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::credentials::{ChainedCredentials, SelectedCredential};
pub use crate::paths::ChroniclePaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::storage::{InMemoryStorage, JsonFileStorage};
