//! Provider trait definition
//!
//! This module defines the capability trait that every LLM backend implements.
//! The orchestration core never calls a provider directly; only agents bound
//! to a provider send messages through it.

use crate::completion::{ChatRequest, ChatResponse};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared provider handle
pub type SharedProvider = Arc<dyn Provider>;

/// Connection configuration for a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (if the backend needs one)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model used when an agent does not name one
    #[serde(default)]
    pub default_model: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Backend specific settings
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_model: None,
            timeout_seconds: default_timeout(),
            extra: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Basic checks shared by all providers
    pub fn validate_common(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(Error::InvalidConfig(
                "timeout_seconds must be positive".to_string(),
            ));
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidConfig(format!(
                    "base_url must be an http(s) URL: {}",
                    url
                )));
            }
        }
        Ok(())
    }
}

/// Trait for LLM providers
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used for registration and binding
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Model used when the caller does not pick one
    fn default_model(&self) -> &str;

    /// Validate a configuration before connecting
    fn validate_config(&self, config: &ProviderConfig) -> Result<()> {
        config.validate_common()
    }

    /// Establish a connection with the given configuration
    async fn connect(&self, config: &ProviderConfig) -> Result<()>;

    /// Release the connection
    async fn disconnect(&self) -> Result<()>;

    /// Send a chat request and wait for the reply
    async fn send_message(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<ChatResponse>;
}
