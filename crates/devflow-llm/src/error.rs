//! Error types for devflow-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Provider not registered or not connected
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Provider rejected its configuration
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// Connecting to the backend failed
    #[error("connection error: {0}")]
    Connection(String),

    /// API error reported by the backend
    #[error("api error: {0}")]
    Api(String),

    /// Request was cancelled by the caller
    #[error("request cancelled")]
    Cancelled,

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Backend returned something unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
