//! End-to-end workflow tests
//!
//! Builds the full stack (provider registry, factory, automatic setup,
//! orchestrator) over the in-process mock provider.

use devflow_core::{
    AgentFactory, AgentOrchestrator, AgentSetupService, AgentType, OrchestratorConfig,
    OrchestratorRequest, OrchestratorState, SetupConfig, WorkflowRequest,
};
use devflow_llm::{MessageRole, MockProvider, ProviderConfig, ProviderRegistry};
use std::sync::Arc;

fn build(provider: Arc<MockProvider>, config: OrchestratorConfig) -> AgentOrchestrator {
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(provider);
    let factory = Arc::new(AgentFactory::new(registry));
    let setup = AgentSetupService::new(factory, SetupConfig::default());
    AgentOrchestrator::new(setup, config)
}

#[tokio::test]
async fn test_implementation_workflow_end_to_end() {
    let provider = Arc::new(MockProvider::new("mock"));
    let orchestrator = build(provider.clone(), OrchestratorConfig::default());

    let response = orchestrator
        .process_command(OrchestratorRequest::new(
            "Implement a rate limiter",
            "token bucket, 100 req/s",
        ))
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.workflow_id.as_deref(), Some("implementation"));
    assert_eq!(response.agent_responses.len(), 5);
    assert_eq!(provider.call_count(), 5);
    assert_eq!(orchestrator.agent_count(), 5);

    let agent_ids: Vec<&str> = response
        .agent_responses
        .iter()
        .map(|r| r.agent_id.as_str())
        .collect();
    assert_eq!(
        agent_ids,
        vec![
            "planning-agent",
            "planning-agent",
            "coding-agent",
            "testing-agent",
            "review-agent"
        ]
    );

    // the last step sees every earlier step in its prompt
    let requests = provider.requests();
    let last = requests.last().unwrap();
    assert_eq!(last.messages[0].role, MessageRole::System);
    assert_eq!(last.messages.len(), 1 + 4 + 1);
    assert!(last.last_user_message().unwrap().contains("Command: review_code"));
    assert_eq!(last.temperature, Some(0.2));

    let coding = &requests[2];
    assert_eq!(coding.temperature, Some(0.3));
    assert_eq!(coding.max_tokens, Some(8192));

    let context = response.context.unwrap();
    assert_eq!(context.history.len(), 5);
    assert!(context.tokens_used > 0);
    assert_eq!(response.content.split("\n\n[mock-model]").count(), 5);
}

#[tokio::test]
async fn test_provider_failure_on_required_step() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.push_response("1. parse\n2. evaluate");
    provider.push_response("modules: lexer, parser");
    provider.push_error(devflow_llm::Error::Api("rate limited".to_string()));
    let orchestrator = build(provider.clone(), OrchestratorConfig::default());

    let response = orchestrator
        .process_command(OrchestratorRequest::new("build a calculator", ""))
        .await;

    assert!(!response.success);
    assert_eq!(response.agent_responses.len(), 3);
    assert_eq!(provider.call_count(), 3);
    let error = response.error.unwrap();
    assert!(error.contains("Implementation"));
    assert!(error.contains("rate limited"));
}

#[tokio::test]
async fn test_code_blocks_become_artifacts() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.push_response("```rust\n#[test]\nfn adds() { assert_eq!(1 + 1, 2); }\n```");
    let orchestrator = build(provider, OrchestratorConfig::default());

    let response = orchestrator
        .process_command(OrchestratorRequest::new("write tests for add", "fn add"))
        .await;

    assert!(response.success);
    assert_eq!(response.workflow_id.as_deref(), Some("testing"));
    let artifacts: Vec<_> = response.artifacts().collect();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "generate_tests-1");
    assert_eq!(artifacts[0].language.as_deref(), Some("rust"));
}

#[tokio::test]
async fn test_execute_workflow_uses_workflow_name_as_command() {
    let provider = Arc::new(MockProvider::new("mock"));
    let orchestrator = build(provider.clone(), OrchestratorConfig::default());

    let response = orchestrator
        .execute_workflow(
            "documentation",
            WorkflowRequest::new("pub fn add(a: i32, b: i32) -> i32").with_session("docs-1"),
        )
        .await;

    assert!(response.success);
    assert_eq!(response.workflow_id.as_deref(), Some("documentation"));
    assert_eq!(response.context.unwrap().session_id, "docs-1");
    let first = &provider.requests()[0];
    assert!(first
        .last_user_message()
        .unwrap()
        .starts_with("Command: generate_docs"));
}

#[tokio::test]
async fn test_token_budget_stops_workflow() {
    let provider = Arc::new(MockProvider::new("mock"));
    let orchestrator = build(provider.clone(), OrchestratorConfig::default().with_token_budget(1));

    let response = orchestrator
        .process_command(OrchestratorRequest::new("refactor the loop", "for i in 0..n {}"))
        .await;

    assert!(!response.success);
    assert_eq!(response.agent_responses.len(), 1);
    assert!(response.error.unwrap().contains("token budget exceeded"));
}

#[tokio::test]
async fn test_unreachable_provider_leaves_pool_empty() {
    let provider = Arc::new(MockProvider::new("down").refusing_connect());
    let orchestrator = build(provider, OrchestratorConfig::default());

    orchestrator.initialize().await.unwrap();
    assert_eq!(orchestrator.agent_count(), 0);

    let response = orchestrator
        .process_command(OrchestratorRequest::new("review this", ""))
        .await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Code Analysis"));
}

#[tokio::test]
async fn test_configured_default_provider() {
    let registry = Arc::new(ProviderRegistry::new());
    let local = Arc::new(MockProvider::new("local").with_model("llama"));
    let remote = Arc::new(MockProvider::new("remote").with_model("gpt-4o"));
    registry.register(local.clone());
    registry.register(remote.clone());
    assert!(registry.connect("local", &ProviderConfig::default()).await);

    let setup = AgentSetupService::new(
        Arc::new(AgentFactory::new(registry)),
        SetupConfig {
            default_provider: Some("remote".to_string()),
            ..Default::default()
        },
    );
    let orchestrator = AgentOrchestrator::new(setup, OrchestratorConfig::default());

    let response = orchestrator
        .process_command(OrchestratorRequest::new("hello", ""))
        .await;
    assert!(response.success);
    assert_eq!(local.call_count(), 0);
    assert_eq!(remote.call_count(), 1);
    assert_eq!(remote.requests()[0].model, "gpt-4o");
}

#[tokio::test]
async fn test_shutdown_then_restart() {
    let provider = Arc::new(MockProvider::new("mock"));
    let orchestrator = build(provider, OrchestratorConfig::default());

    orchestrator.initialize().await.unwrap();
    assert!(orchestrator.get_agent_for_type(AgentType::Coding).is_some());

    orchestrator.shutdown().await;
    assert_eq!(orchestrator.state(), OrchestratorState::Uninitialized);
    assert_eq!(orchestrator.agent_count(), 0);

    let response = orchestrator
        .process_command(OrchestratorRequest::new("hello", ""))
        .await;
    assert!(response.success);
    assert_eq!(orchestrator.state(), OrchestratorState::Initialized);
}
