//! Mock provider
//!
//! An in-process provider that returns queued responses, or echoes the last
//! user message when the queue is empty. Used by tests and by the CLI's
//! dry-run mode.

use crate::completion::{ChatRequest, ChatResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::provider::{Provider, ProviderConfig};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A scripted provider with no network access
pub struct MockProvider {
    id: String,
    model: String,
    responses: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicUsize,
    connected: AtomicBool,
    reject_config: bool,
    refuse_connect: bool,
    delay: Option<Duration>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("mock")
    }
}

impl MockProvider {
    /// Create a mock provider with the given id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: "mock-model".to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            connected: AtomicBool::new(false),
            reject_config: false,
            refuse_connect: false,
            delay: None,
        }
    }

    /// Set the default model name
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Fail every `validate_config` call
    #[must_use]
    pub fn rejecting_config(mut self) -> Self {
        self.reject_config = true;
        self
    }

    /// Fail every `connect` call
    #[must_use]
    pub fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    /// Wait this long before answering each message
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response
    pub fn push_response(&self, content: impl Into<String>) {
        let response = ChatResponse::new(content, self.model.clone());
        self.queue().push_back(Ok(response));
    }

    /// Queue an error
    pub fn push_error(&self, error: Error) {
        self.queue().push_back(Err(error));
    }

    /// Number of `send_message` calls so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether `connect` succeeded and `disconnect` has not been called since
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<ChatResponse>>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn echo(&self, request: &ChatRequest) -> ChatResponse {
        let prompt = request.last_user_message().unwrap_or_default();
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };
        let content = format!("[{}] {}", model, prompt);

        // Rough estimate: 4 chars per token
        let prompt_chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
        let usage = TokenUsage::new((prompt_chars / 4) as u32, (content.len() / 4) as u32);
        ChatResponse::new(content, model).with_usage(usage)
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Provider"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn validate_config(&self, config: &ProviderConfig) -> Result<()> {
        if self.reject_config {
            return Err(Error::InvalidConfig(format!(
                "{} rejects every configuration",
                self.id
            )));
        }
        config.validate_common()
    }

    async fn connect(&self, _config: &ProviderConfig) -> Result<()> {
        if self.refuse_connect {
            return Err(Error::Connection(format!("{} refused to connect", self.id)));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send_message(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<ChatResponse> {
        if !self.is_connected() {
            return Err(Error::NotConfigured(self.id.clone()));
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            }
        }

        let queued = self.queue().pop_front();
        match queued {
            Some(result) => result,
            None => Ok(self.echo(&request)),
        }
    }
}
