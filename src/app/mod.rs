//! Application wiring
//!
//! Loads configuration and assembles the provider registry, agent factory,
//! setup service and orchestrator the CLI commands run against.

pub mod config;
pub mod loader;

pub use self::config::AppConfig;
pub use self::loader::load_config;

use anyhow::Result;
use devflow_core::{AgentFactory, AgentOrchestrator, AgentSetupService};
use devflow_llm::{MockProvider, ProviderRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the provider registry.
///
/// Only the in-process dry-run provider has a client; other configured
/// providers are reported and skipped.
pub async fn build_registry(config: &AppConfig) -> Result<Arc<ProviderRegistry>> {
    let registry = Arc::new(ProviderRegistry::new());
    let dry_run = &config.dry_run;

    registry.register(Arc::new(
        MockProvider::new(&dry_run.provider_id).with_model(&dry_run.model),
    ));

    for id in config.providers.keys() {
        if !registry.contains(id) {
            warn!(provider = %id, "No client available for configured provider, skipping");
        }
    }

    let provider_config = config.provider_config(&dry_run.provider_id);
    if !registry.connect(&dry_run.provider_id, &provider_config).await {
        anyhow::bail!("Failed to connect provider '{}'", dry_run.provider_id);
    }

    info!(providers = registry.len(), "Provider registry ready");
    Ok(registry)
}

/// Build an orchestrator from configuration
pub async fn build_orchestrator(config: &AppConfig) -> Result<Arc<AgentOrchestrator>> {
    let registry = build_registry(config).await?;
    let factory = Arc::new(AgentFactory::new(registry));
    let setup = AgentSetupService::new(factory, config.setup.clone());
    Ok(Arc::new(AgentOrchestrator::new(
        setup,
        config.orchestrator.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_core::{AgentType, OrchestratorRequest};

    #[tokio::test]
    async fn test_registry_connects_dry_run_provider() {
        let registry = build_registry(&AppConfig::default()).await.unwrap();
        assert!(registry.is_connected("echo"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_providers_are_skipped() {
        let mut config = AppConfig::default();
        config
            .providers
            .insert("openai".to_string(), Default::default());

        let registry = build_registry(&config).await.unwrap();
        assert!(!registry.contains("openai"));
        assert!(registry.contains("echo"));
    }

    #[tokio::test]
    async fn test_orchestrator_runs_against_echo() {
        let orchestrator = build_orchestrator(&AppConfig::default()).await.unwrap();

        let response = orchestrator
            .process_command(OrchestratorRequest::new("review main.rs", "fn main() {}"))
            .await;
        assert!(response.success, "{:?}", response.error);
        assert_eq!(response.workflow_id.as_deref(), Some("review"));
        assert!(response.content.starts_with("[echo-model]"));
        assert!(orchestrator.get_agent_for_type(AgentType::Review).is_some());
    }
}
