//! Built-in workflows

use super::types::{WorkflowDefinition, WorkflowStep};
use crate::agents::AgentType;

/// Plan, design, implement, test and review
pub const IMPLEMENTATION: &str = "implementation";
/// Analysis with optional audit and suggestions
pub const REVIEW: &str = "review";
/// Test generation
pub const TESTING: &str = "testing";
/// Documentation writing
pub const DOCUMENTATION: &str = "documentation";
/// Analyze, refactor, verify
pub const REFACTORING: &str = "refactoring";
/// Fallback for unclassified commands
pub const DEFAULT: &str = "default";

/// All built-in workflows
#[must_use]
pub fn builtin_workflows() -> Vec<WorkflowDefinition> {
    vec![
        implementation(),
        review(),
        testing(),
        documentation(),
        refactoring(),
        default_workflow(),
    ]
}

fn implementation() -> WorkflowDefinition {
    WorkflowDefinition::new(
        IMPLEMENTATION,
        "Feature Implementation",
        "Plan, design, implement, test and review a change",
    )
    .with_step(WorkflowStep::new(1, "Planning", AgentType::Planning, "create_plan"))
    .with_step(WorkflowStep::new(
        2,
        "Architecture Design",
        AgentType::Planning,
        "design_architecture",
    ))
    .with_step(WorkflowStep::new(3, "Implementation", AgentType::Coding, "implement"))
    .with_step(WorkflowStep::new(4, "Testing", AgentType::Testing, "generate_tests"))
    .with_step(WorkflowStep::new(5, "Code Review", AgentType::Review, "review_code").optional())
}

fn review() -> WorkflowDefinition {
    WorkflowDefinition::new(REVIEW, "Code Review", "Analyze code quality and security")
        .with_step(WorkflowStep::new(1, "Code Analysis", AgentType::Review, "analyze_code"))
        .with_step(
            WorkflowStep::new(2, "Security Audit", AgentType::Review, "security_audit").optional(),
        )
        .with_step(
            WorkflowStep::new(
                3,
                "Improvement Suggestions",
                AgentType::Review,
                "suggest_improvements",
            )
            .optional(),
        )
}

fn testing() -> WorkflowDefinition {
    WorkflowDefinition::new(TESTING, "Test Generation", "Generate tests and an execution plan")
        .with_step(WorkflowStep::new(1, "Test Generation", AgentType::Testing, "generate_tests"))
        .with_step(
            WorkflowStep::new(
                2,
                "Test Execution Plan",
                AgentType::Testing,
                "plan_test_execution",
            )
            .optional(),
        )
}

fn documentation() -> WorkflowDefinition {
    WorkflowDefinition::new(DOCUMENTATION, "Documentation", "Write and review documentation")
        .with_step(WorkflowStep::new(
            1,
            "Documentation",
            AgentType::Documentation,
            "generate_docs",
        ))
        .with_step(
            WorkflowStep::new(2, "Documentation Review", AgentType::Review, "review_docs")
                .optional(),
        )
}

fn refactoring() -> WorkflowDefinition {
    WorkflowDefinition::new(
        REFACTORING,
        "Refactoring",
        "Analyze, restructure and verify behavior is preserved",
    )
    .with_step(WorkflowStep::new(1, "Code Analysis", AgentType::Review, "analyze_code"))
    .with_step(WorkflowStep::new(2, "Refactoring", AgentType::Coding, "refactor_code"))
    .with_step(WorkflowStep::new(3, "Verification", AgentType::Testing, "verify_behavior").optional())
}

fn default_workflow() -> WorkflowDefinition {
    WorkflowDefinition::new(DEFAULT, "General Assistance", "Single-step general request")
        .with_step(WorkflowStep::new(
            1,
            "General Assistance",
            AgentType::Planning,
            "handle_request",
        ))
}
