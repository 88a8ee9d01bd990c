//! Wiring of the newsroom components.

use chronicle_core::cache::KeyValueStorage;
use chronicle_core::clock::{Clock, SystemClock};
use chronicle_core::config::ChronicleConfig;
use chronicle_core::credential::CredentialProvider;
use chronicle_core::error::{ChronicleError, Result};
use chronicle_core::generation::GenerationClient;
use chronicle_infrastructure::{
    ChainedCredentials, ChroniclePaths, ConfigService, JsonFileStorage, SecretServiceImpl,
    SelectedCredential,
};
use chronicle_interaction::GeminiApiClient;
use std::sync::Arc;

use crate::cache_store::CacheStore;
use crate::chat_session::ChatSession;
use crate::cover_art_service::{CoverArtService, CoverOutcome};
use crate::issue::{IssueBoard, IssueOrchestrator, PanelWorkflow, StartupAction};
use crate::story_workflow::StoryWorkflow;

/// Result of reacting to a credential change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCheck {
    pub cover: CoverOutcome,
    pub issue: StartupAction,
}

/// Everything a host UI needs, sharing one board, client and credential gate.
pub struct Newsroom {
    config: ChronicleConfig,
    credentials: Arc<dyn CredentialProvider>,
    selected: Option<Arc<SelectedCredential>>,
    issue: IssueOrchestrator,
    stories: StoryWorkflow,
    chat: ChatSession,
    cover: CoverArtService,
}

impl Newsroom {
    pub fn new(
        config: ChronicleConfig,
        client: Arc<dyn GenerationClient>,
        credentials: Arc<dyn CredentialProvider>,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let board = Arc::new(IssueBoard::new());
        let cache = CacheStore::new(storage);

        let workflow = PanelWorkflow::new(client.clone(), board.clone(), clock.clone());
        let mut issue = IssueOrchestrator::new(
            board.clone(),
            workflow,
            config.categories.clone(),
            credentials.clone(),
        );
        if config.restore_cached_issue {
            issue = issue.with_issue_cache(cache.clone(), clock.clone());
        }

        Self {
            stories: StoryWorkflow::new(client.clone(), board),
            chat: ChatSession::new(client.clone(), credentials.clone(), clock.clone()),
            cover: CoverArtService::new(client, credentials.clone(), cache, clock),
            issue,
            credentials,
            selected: None,
            config,
        }
    }

    /// Attaches the slot an interactive key selection flow writes into.
    pub fn with_selected_credential(mut self, selected: Arc<SelectedCredential>) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn config(&self) -> &ChronicleConfig {
        &self.config
    }

    pub fn issue(&self) -> &IssueOrchestrator {
        &self.issue
    }

    pub fn stories(&self) -> &StoryWorkflow {
        &self.stories
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn cover(&self) -> &CoverArtService {
        &self.cover
    }

    pub async fn has_credential(&self) -> bool {
        self.credentials.is_available().await
    }

    /// Stores an interactively selected key and reacts to it.
    pub async fn select_credential(&self, api_key: impl Into<String>) -> Result<CredentialCheck> {
        let selected = self.selected.as_ref().ok_or_else(|| {
            ChronicleError::config("No interactive credential selection is configured")
        })?;
        selected.select(api_key).await;
        Ok(self.on_credential_change().await)
    }

    /// Loads the cover and starts the first issue, concurrently.
    ///
    /// Call whenever credential availability may have changed; the issue is
    /// only started once over the lifetime of the newsroom.
    pub async fn on_credential_change(&self) -> CredentialCheck {
        let (cover, issue) = tokio::join!(self.cover.load(), self.issue.start_if_ready());
        tracing::debug!(?cover, started = self.issue.has_started(), "Handled credential change");
        CredentialCheck { cover, issue }
    }
}

/// Builds the production newsroom rooted at `paths`.
///
/// Credentials come from an interactive selection first, then from the
/// environment and `secret.json`.
pub fn bootstrap_newsroom(paths: &ChroniclePaths) -> Result<Newsroom> {
    let config = ConfigService::new(paths.config_file()).load()?;

    let selected = Arc::new(SelectedCredential::new());
    let interactive: Arc<dyn CredentialProvider> = selected.clone();
    let stored: Arc<dyn CredentialProvider> =
        Arc::new(SecretServiceImpl::new(paths.secret_file()));
    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(ChainedCredentials::new(vec![interactive, stored]));
    let client: Arc<dyn GenerationClient> =
        Arc::new(GeminiApiClient::new(credentials.clone(), &config)?);
    let storage: Arc<dyn KeyValueStorage> = Arc::new(JsonFileStorage::new(paths.cache_file()));

    tracing::info!(
        config_dir = %paths.config_dir().display(),
        categories = config.categories.len(),
        "Newsroom ready"
    );

    Ok(
        Newsroom::new(config, client, credentials, storage, Arc::new(SystemClock))
            .with_selected_credential(selected),
    )
}
