//! Application configuration types

use devflow_core::{OrchestratorConfig, SetupConfig};
use devflow_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub setup: SetupConfig,
    /// Connection settings keyed by provider id
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub dry_run: DryRunConfig,
}

/// In-process echo provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunConfig {
    #[serde(default = "default_dry_run_provider")]
    pub provider_id: String,
    #[serde(default = "default_dry_run_model")]
    pub model: String,
}

fn default_dry_run_provider() -> String {
    "echo".to_string()
}

fn default_dry_run_model() -> String {
    "echo-model".to_string()
}

impl Default for DryRunConfig {
    fn default() -> Self {
        Self {
            provider_id: default_dry_run_provider(),
            model: default_dry_run_model(),
        }
    }
}

impl AppConfig {
    /// Connection settings for a provider, defaults when not configured
    pub fn provider_config(&self, id: &str) -> ProviderConfig {
        self.providers.get(id).cloned().unwrap_or_default()
    }
}
