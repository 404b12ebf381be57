//! Application state: the composition root shared by CLI commands and HTTP
//! handlers.

use std::sync::Arc;

use anyhow::Context;

use tripchat_core::chat::orchestrator::{ChatOrchestrator, OrchestratorSettings};
use tripchat_core::session::reaper::SessionReaper;
use tripchat_core::session::store::SessionStore;
use tripchat_infra::config::resolve_api_key;
use tripchat_infra::content::create_search;
use tripchat_infra::llm::create_provider;
use tripchat_types::config::TripchatConfig;

/// Shared application state holding the chat pipeline.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub config: Arc<TripchatConfig>,
}

impl AppState {
    /// Wire the session store, Completion Service provider and search backend.
    pub fn init(config: TripchatConfig) -> anyhow::Result<Self> {
        let api_key = resolve_api_key(&config.completion);
        let provider = create_provider(&config.completion, api_key).with_context(|| {
            format!(
                "could not configure the completion provider (is {} set?)",
                config.completion.api_key_env
            )
        })?;
        let search = create_search(&config.search).context("could not configure content search")?;

        let store = Arc::new(SessionStore::new(config.session.max_history));
        let orchestrator = ChatOrchestrator::new(
            store,
            provider,
            search,
            OrchestratorSettings::from_config(&config),
        );

        tracing::info!(
            provider = orchestrator.provider_name(),
            search = orchestrator.search_name(),
            max_history = config.session.max_history,
            "chat pipeline ready"
        );

        Ok(Self::from_parts(orchestrator, config))
    }

    pub fn from_parts(orchestrator: ChatOrchestrator, config: TripchatConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }

    /// Start the background sweep of idle sessions.
    pub fn start_reaper(&self) -> SessionReaper {
        SessionReaper::start(
            Arc::clone(self.orchestrator.store()),
            self.config.session.reaper_interval(),
            self.config.session.ttl(),
        )
    }
}
