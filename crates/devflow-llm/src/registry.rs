//! Provider registry
//!
//! Tracks available providers by id, their connection state and the last
//! configuration they connected with. The registry never sends messages; it
//! only hands out provider handles.

use crate::provider::{ProviderConfig, SharedProvider};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::RwLock;
use tracing::{debug, info, warn};

struct ProviderEntry {
    provider: SharedProvider,
    connected: bool,
    /// Config of the last successful connect, kept for reconnect-on-demand
    config: Option<ProviderConfig>,
}

/// Registry for managing multiple providers
pub struct ProviderRegistry {
    providers: DashMap<String, ProviderEntry>,
    /// Registration order
    order: RwLock<Vec<String>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Register a provider. A duplicate id is ignored and returns `false`.
    pub fn register(&self, provider: SharedProvider) -> bool {
        let id = provider.id().to_string();
        let inserted = match self.providers.entry(id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ProviderEntry {
                    provider,
                    connected: false,
                    config: None,
                });
                true
            }
        };

        if inserted {
            self.order
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .push(id.clone());
            debug!(provider = %id, "Registered provider");
        } else {
            warn!(provider = %id, "Provider already registered, ignoring duplicate");
        }
        inserted
    }

    /// Get a provider by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedProvider> {
        self.providers.get(id).map(|entry| entry.provider.clone())
    }

    /// All providers in registration order
    #[must_use]
    pub fn list_all(&self) -> Vec<SharedProvider> {
        self.ids().iter().filter_map(|id| self.get(id)).collect()
    }

    /// Provider ids in registration order
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.order
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Check if a provider is registered
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Validate and connect a provider.
    ///
    /// Only a provider that both validates and connects is marked connected
    /// and has `config` cached. Failures are logged and reported as `false`.
    pub async fn connect(&self, id: &str, config: &ProviderConfig) -> bool {
        let Some(provider) = self.get(id) else {
            warn!(provider = %id, "Cannot connect unknown provider");
            return false;
        };

        if let Err(e) = provider.validate_config(config) {
            warn!(provider = %id, error = %e, "Provider configuration rejected");
            return false;
        }

        match provider.connect(config).await {
            Ok(()) => {
                if let Some(mut entry) = self.providers.get_mut(id) {
                    entry.connected = true;
                    entry.config = Some(config.clone());
                }
                info!(provider = %id, "Provider connected");
                true
            }
            Err(e) => {
                if let Some(mut entry) = self.providers.get_mut(id) {
                    entry.connected = false;
                }
                warn!(provider = %id, error = %e, "Provider connection failed");
                false
            }
        }
    }

    /// Disconnect a provider. The cached configuration is kept.
    pub async fn disconnect(&self, id: &str) {
        let Some(provider) = self.get(id) else {
            debug!(provider = %id, "Disconnect requested for unknown provider");
            return;
        };

        if let Err(e) = provider.disconnect().await {
            warn!(provider = %id, error = %e, "Provider disconnect reported an error");
        }
        if let Some(mut entry) = self.providers.get_mut(id) {
            entry.connected = false;
        }
        info!(provider = %id, "Provider disconnected");
    }

    /// Disconnect every connected provider
    pub async fn disconnect_all(&self) {
        for id in self.ids() {
            if self.is_connected(&id) {
                self.disconnect(&id).await;
            }
        }
    }

    /// Whether a provider is currently connected
    #[must_use]
    pub fn is_connected(&self, id: &str) -> bool {
        self.providers
            .get(id)
            .map(|entry| entry.connected)
            .unwrap_or(false)
    }

    /// Configuration cached by the last successful connect
    #[must_use]
    pub fn cached_config(&self, id: &str) -> Option<ProviderConfig> {
        self.providers.get(id).and_then(|entry| entry.config.clone())
    }

    /// Connect on demand.
    ///
    /// Reuses the cached configuration when the provider connected before,
    /// otherwise tries the default configuration.
    pub async fn ensure_connected(&self, id: &str) -> bool {
        let cached = match self.providers.get(id) {
            Some(entry) if entry.connected => return true,
            Some(entry) => entry.config.clone(),
            None => {
                warn!(provider = %id, "Provider not registered");
                return false;
            }
        };

        let config = cached.unwrap_or_default();
        debug!(provider = %id, "Reconnecting provider on demand");
        self.connect(id, &config).await
    }

    /// Id of the first connected provider in registration order
    #[must_use]
    pub fn first_connected(&self) -> Option<String> {
        self.ids().into_iter().find(|id| self.is_connected(id))
    }

    /// Display info for all providers
    #[must_use]
    pub fn provider_info(&self) -> Vec<ProviderInfo> {
        self.ids()
            .into_iter()
            .filter_map(|id| {
                self.providers.get(&id).map(|entry| ProviderInfo {
                    id: id.clone(),
                    name: entry.provider.name().to_string(),
                    default_model: entry.provider.default_model().to_string(),
                    connected: entry.connected,
                })
            })
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider information for display
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    /// Provider id
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Default model
    pub default_model: String,
    /// Connection state
    pub connected: bool,
}
