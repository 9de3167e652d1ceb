//! Agent Setup Service
//!
//! Turns the setup configuration into a list of initialized agents, either
//! one per built-in type with presets (automatic mode) or one per explicit
//! configuration (custom mode).

use super::agent::{Agent, SharedAgent};
use super::factory::AgentFactory;
use super::types::{AgentConfiguration, AgentType};
use crate::config::SetupConfig;
use crate::error::{Error, Result};
use devflow_llm::ProviderRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Preset sampling settings `(temperature, max_tokens)` for a built-in type
#[must_use]
pub fn preset(agent_type: AgentType) -> (f32, u32) {
    match agent_type {
        AgentType::Planning => (0.7, 4096),
        AgentType::Coding => (0.3, 8192),
        AgentType::Review => (0.2, 4096),
        AgentType::Testing => (0.1, 4096),
        AgentType::Documentation => (0.5, 4096),
        AgentType::Custom => (0.7, 4096),
    }
}

/// Builds and initializes the agent pool
pub struct AgentSetupService {
    factory: Arc<AgentFactory>,
    registry: Arc<ProviderRegistry>,
    config: SetupConfig,
}

impl AgentSetupService {
    /// Create a setup service
    #[must_use]
    pub fn new(factory: Arc<AgentFactory>, config: SetupConfig) -> Self {
        let registry = factory.provider_registry().clone();
        Self {
            factory,
            registry,
            config,
        }
    }

    /// Setup configuration
    #[must_use]
    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    /// Provider used in automatic mode.
    ///
    /// The configured default if registered, else the first connected
    /// provider, else the first registered one.
    #[must_use]
    pub fn resolve_provider(&self) -> Option<String> {
        if let Some(preferred) = &self.config.default_provider {
            if self.registry.contains(preferred) {
                return Some(preferred.clone());
            }
            warn!(provider = %preferred, "Configured default provider is not registered");
        }
        self.registry
            .first_connected()
            .or_else(|| self.registry.ids().into_iter().next())
    }

    /// Preset configuration for a built-in type bound to `provider_id`
    #[must_use]
    pub fn automatic_configuration(
        &self,
        agent_type: AgentType,
        provider_id: &str,
    ) -> AgentConfiguration {
        let model = self.config.default_model.clone().unwrap_or_else(|| {
            self.registry
                .get(provider_id)
                .map(|p| p.default_model().to_string())
                .unwrap_or_default()
        });
        let (temperature, max_tokens) = preset(agent_type);
        AgentConfiguration::new(agent_type.default_agent_id(), agent_type, provider_id, model)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens)
    }

    /// Create and initialize agents.
    ///
    /// Fails only when no provider is registered; agents that cannot be
    /// created or initialized are logged and left out.
    #[instrument(skip(self, cancel), fields(custom = self.config.is_custom()))]
    pub async fn setup_agents(&self, cancel: CancellationToken) -> Result<Vec<SharedAgent>> {
        if self.registry.is_empty() {
            return Err(Error::Setup("no providers registered".to_string()));
        }

        let agents = if self.config.is_custom() {
            self.setup_custom(&cancel).await
        } else {
            self.setup_automatic(&cancel).await?
        };

        info!(count = agents.len(), "Agent setup complete");
        Ok(agents)
    }

    async fn setup_automatic(&self, cancel: &CancellationToken) -> Result<Vec<SharedAgent>> {
        let provider_id = self
            .resolve_provider()
            .ok_or_else(|| Error::Setup("no providers registered".to_string()))?;

        let mut agents = Vec::with_capacity(AgentType::BUILT_IN.len());
        for agent_type in AgentType::BUILT_IN {
            let Some(agent) = self.factory.create(agent_type) else {
                warn!(agent_type = %agent_type, "Factory has no built-in agent");
                continue;
            };
            let config = self.automatic_configuration(agent_type, &provider_id);
            if let Some(agent) = Self::initialize(agent, config, cancel).await {
                agents.push(agent);
            }
        }
        Ok(agents)
    }

    async fn setup_custom(&self, cancel: &CancellationToken) -> Vec<SharedAgent> {
        let mut agents = Vec::with_capacity(self.config.custom_agents.len());
        for config in &self.config.custom_agents {
            if !self.registry.contains(&config.provider_id) {
                warn!(
                    agent_id = %config.agent_id,
                    provider = %config.provider_id,
                    "Skipping agent: provider not registered"
                );
                continue;
            }

            let agent = match config.factory_key() {
                Some(key) => self.factory.create_named(key, config.agent_type),
                None => self.factory.create(config.agent_type),
            };
            let Some(agent) = agent else {
                warn!(
                    agent_id = %config.agent_id,
                    agent_type = %config.agent_type,
                    factory = config.factory_key().unwrap_or("built-in"),
                    "Skipping agent: factory cannot create it"
                );
                continue;
            };

            if let Some(agent) = Self::initialize(agent, config.clone(), cancel).await {
                agents.push(agent);
            }
        }
        agents
    }

    async fn initialize(
        agent: SharedAgent,
        config: AgentConfiguration,
        cancel: &CancellationToken,
    ) -> Option<SharedAgent> {
        let agent_id = config.agent_id.clone();
        match agent.initialize(config, cancel.child_token()).await {
            Ok(()) => Some(agent),
            Err(e) => {
                warn!(agent_id = %agent_id, error = %e, "Agent failed to initialize");
                None
            }
        }
    }
}
