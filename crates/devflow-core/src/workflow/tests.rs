use super::*;
use crate::agents::AgentType;
use crate::error::Error;
use tokio_test::{assert_err, assert_ok};

fn request(command: &str) -> OrchestratorRequest {
    OrchestratorRequest::new(command, "")
}

#[test]
fn test_builtin_workflows_registered() {
    let engine = WorkflowEngine::new();
    let ids: Vec<String> = engine.list_workflows().into_iter().map(|w| w.id).collect();
    assert_eq!(
        ids,
        vec![
            "default",
            "documentation",
            "implementation",
            "refactoring",
            "review",
            "testing"
        ]
    );
}

#[test]
fn test_implementation_steps() {
    let engine = WorkflowEngine::new();
    let workflow = engine.get_workflow("implementation").unwrap();
    let steps = workflow.ordered_steps();

    let commands: Vec<&str> = steps.iter().map(|s| s.command.as_str()).collect();
    assert_eq!(
        commands,
        vec![
            "create_plan",
            "design_architecture",
            "implement",
            "generate_tests",
            "review_code"
        ]
    );
    assert_eq!(steps[2].agent_type, AgentType::Coding);
    assert!(steps[..4].iter().all(|s| s.required));
    assert!(!steps[4].required);
}

#[test]
fn test_builtin_definitions_are_valid() {
    for workflow in builtin_workflows() {
        assert!(workflow.validate().is_ok(), "{} invalid", workflow.id);
        assert!(!workflow.steps.is_empty());
    }
}

#[test]
fn test_determine_workflow() {
    let engine = WorkflowEngine::new();
    assert_eq!(
        engine.determine_workflow(&request("Implement login")).unwrap().id,
        "implementation"
    );
    assert_eq!(
        engine.determine_workflow(&request("review auth.rs")).unwrap().id,
        "review"
    );
    assert_eq!(
        engine.determine_workflow(&request("what time is it")).unwrap().id,
        "default"
    );
}

#[test]
fn test_unregistered_classification_falls_back_to_default() {
    let engine = WorkflowEngine::new();
    engine.remove_workflow("testing");
    assert_eq!(
        engine.determine_workflow(&request("write tests")).unwrap().id,
        "default"
    );
}

#[test]
fn test_no_default_yields_none() {
    let engine = WorkflowEngine::new();
    engine.remove_workflow("default");
    assert!(engine.determine_workflow(&request("hello")).is_none());
    assert!(engine.determine_workflow(&request("refactor it")).is_some());
}

struct FixedClassifier(&'static str);

impl WorkflowClassifier for FixedClassifier {
    fn classify(&self, _command: &str) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[test]
fn test_custom_classifier() {
    let engine = WorkflowEngine::with_classifier(FixedClassifier("documentation"));
    assert_eq!(
        engine.determine_workflow(&request("implement x")).unwrap().id,
        "documentation"
    );
}

#[test]
fn test_register_overwrites() {
    let engine = WorkflowEngine::new();
    let custom = WorkflowDefinition::new("default", "Echo", "single step")
        .with_step(WorkflowStep::new(1, "Echo", AgentType::Coding, "echo"));
    assert_ok!(engine.register_workflow(custom));

    let workflow = engine.get_workflow("default").unwrap();
    assert_eq!(workflow.name, "Echo");
    assert_eq!(engine.list_workflows().len(), 6);
}

#[test]
fn test_register_rejects_invalid() {
    let engine = WorkflowEngine::new();
    let duplicate_orders = WorkflowDefinition::new("dup", "Dup", "")
        .with_step(WorkflowStep::new(1, "a", AgentType::Coding, "a"))
        .with_step(WorkflowStep::new(1, "b", AgentType::Coding, "b"));

    let result = engine.register_workflow(duplicate_orders);
    assert!(matches!(result, Err(Error::InvalidWorkflow(_))));
    assert!(engine.get_workflow("dup").is_none());

    let empty_id = WorkflowDefinition::new("", "Empty", "");
    assert_err!(engine.register_workflow(empty_id));
}

#[test]
fn test_classification_examples() {
    let engine = WorkflowEngine::new();
    let cases = [
        ("implement new feature", "implementation"),
        ("create user authentication", "implementation"),
        ("build login system", "implementation"),
        ("add feature", "implementation"),
        ("review code", "review"),
        ("analyze security", "review"),
        ("test feature", "testing"),
        ("document api", "documentation"),
        ("random command", "default"),
    ];

    for (command, expected) in cases {
        let workflow = engine.determine_workflow(&request(command)).unwrap();
        assert_eq!(workflow.id, expected, "{command}");

        let types: Vec<AgentType> = workflow.steps.iter().map(|s| s.agent_type).collect();
        match expected {
            "implementation" => {
                for required in [AgentType::Planning, AgentType::Coding, AgentType::Testing] {
                    assert!(types.contains(&required), "{command}: missing {required}");
                }
                let ordered = workflow.ordered_steps();
                let names: Vec<&str> = ordered.iter().take(3).map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["Planning", "Architecture Design", "Implementation"]);
            }
            "review" => assert!(workflow.steps.iter().any(|s| s.command == "analyze_code")),
            "testing" => assert!(types.contains(&AgentType::Testing)),
            "default" => assert_eq!(workflow.steps.len(), 1),
            _ => {}
        }
    }
}
