//! Integration tests for devflow
//!
//! These tests verify the integration between the workspace crates:
//! - devflow-llm: provider registry and the mock provider
//! - devflow-core: factory, custom agent setup and workflow execution

use devflow_core::{
    Agent, AgentConfiguration, AgentFactory, AgentOrchestrator, AgentProfile, AgentSetupService,
    AgentType, LlmAgent, OrchestratorConfig, OrchestratorRequest, SetupConfig, WorkflowDefinition,
    WorkflowEngine, WorkflowStep,
};
use devflow_llm::{MockProvider, Provider, ProviderConfig, ProviderRegistry};
use std::sync::Arc;

const SECURITY_PROMPT: &str = "You audit code for security issues.";

async fn connected_registry(providers: &[Arc<MockProvider>]) -> Arc<ProviderRegistry> {
    let registry = Arc::new(ProviderRegistry::new());
    for provider in providers {
        registry.register(provider.clone());
        assert!(registry.connect(provider.id(), &ProviderConfig::default()).await);
    }
    registry
}

fn security_factory(registry: Arc<ProviderRegistry>) -> AgentFactory {
    AgentFactory::new(registry).with_constructor("security", |agent_type, registry| {
        let mut profile = AgentProfile::review();
        profile.agent_type = agent_type;
        profile.name = "Security Reviewer".to_string();
        profile.system_prompt = SECURITY_PROMPT.to_string();
        Arc::new(LlmAgent::new(profile, registry))
    })
}

// ============================================================================
// Custom setup
// ============================================================================

#[tokio::test]
async fn test_custom_agents_across_providers() {
    let local = Arc::new(MockProvider::new("local").with_model("llama"));
    let remote = Arc::new(MockProvider::new("remote").with_model("gpt-4o"));
    let registry = connected_registry(&[local.clone(), remote.clone()]).await;

    let setup = AgentSetupService::new(
        Arc::new(security_factory(registry)),
        SetupConfig {
            custom_agents: vec![
                AgentConfiguration::new("auditor", AgentType::Review, "remote", "gpt-4o")
                    .with_setting("factory", "security"),
                AgentConfiguration::new("writer", AgentType::Documentation, "local", "llama"),
                AgentConfiguration::new("ghost", AgentType::Coding, "offline", "none"),
            ],
            ..Default::default()
        },
    );
    let orchestrator = AgentOrchestrator::new(setup, OrchestratorConfig::default());
    orchestrator.initialize().await.unwrap();

    let ids: Vec<String> = orchestrator
        .get_all_agents()
        .iter()
        .map(|a| a.id().to_string())
        .collect();
    assert_eq!(ids, vec!["auditor", "writer"]);
    assert_eq!(
        orchestrator.get_agent("auditor").unwrap().name(),
        "Security Reviewer"
    );

    let response = orchestrator
        .process_command(OrchestratorRequest::new("review login.rs", "fn login() {}"))
        .await;
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.workflow_id.as_deref(), Some("review"));
    assert!(response
        .agent_responses
        .iter()
        .all(|r| r.agent_id == "auditor"));
    assert_eq!(local.call_count(), 0);

    let requests = remote.requests();
    assert!(!requests.is_empty());
    assert_eq!(requests[0].messages[0].content, SECURITY_PROMPT);
    assert_eq!(requests[0].model, "gpt-4o");

    orchestrator.shutdown().await;
    assert_eq!(orchestrator.agent_count(), 0);
}

// ============================================================================
// Custom workflows
// ============================================================================

#[tokio::test]
async fn test_registered_workflow_runs_in_order() {
    let provider = Arc::new(MockProvider::new("mock"));
    let registry = connected_registry(&[provider.clone()]).await;

    let engine = WorkflowEngine::new();
    engine
        .register_workflow(
            WorkflowDefinition::new("release", "Release", "prepare a release")
                .with_step(WorkflowStep::new(
                    3,
                    "Notes",
                    AgentType::Documentation,
                    "write_changelog",
                ))
                .with_step(WorkflowStep::new(1, "Plan", AgentType::Planning, "plan_release"))
                .with_step(
                    WorkflowStep::new(2, "Audit", AgentType::Review, "audit_changes").optional(),
                ),
        )
        .unwrap();

    let setup = AgentSetupService::new(
        Arc::new(AgentFactory::new(registry)),
        SetupConfig::default(),
    );
    let orchestrator =
        AgentOrchestrator::new(setup, OrchestratorConfig::default()).with_workflow_engine(engine);

    let response = orchestrator
        .execute_workflow("release", devflow_core::WorkflowRequest::new("v0.2.0"))
        .await;

    assert!(response.success, "{:?}", response.error);
    let commands: Vec<String> = provider
        .requests()
        .iter()
        .filter_map(|r| r.last_user_message())
        .map(|m| m.lines().next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        commands,
        vec![
            "Command: plan_release",
            "Command: audit_changes",
            "Command: write_changelog"
        ]
    );
}
