//! Devflow LLM - Provider Capability Layer
//!
//! This crate provides the provider side of devflow:
//! - Provider: capability trait implemented by LLM backends
//! - Registry: tracks registered providers, their connection state and config
//! - Messages: chat message, request and response types
//! - Mock: scripted in-process provider for tests and dry runs
//!
//! Wire-level vendor clients live outside this crate and plug in through
//! the [`Provider`] trait.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod registry;

pub use completion::{ChatRequest, ChatResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{ChatMessage, MessageRole};
pub use mock::MockProvider;
pub use provider::{Provider, ProviderConfig, SharedProvider};
pub use registry::{ProviderInfo, ProviderRegistry};
