//! Command classification
//!
//! Maps a free-form command to a workflow id.

use super::builtin::{DOCUMENTATION, IMPLEMENTATION, REFACTORING, REVIEW, TESTING};

/// Maps a command to a workflow id
pub trait WorkflowClassifier: Send + Sync {
    /// Workflow id for the command, or `None` when nothing matches
    fn classify(&self, command: &str) -> Option<String>;
}

/// Keyword classifier over lowercased word tokens.
///
/// Rules are checked in order; the first match wins:
///
/// | workflow | tokens |
/// |----------|--------|
/// | implementation | `implement*`, `create*`, `build*`, or `add` with `feature*` |
/// | review | `review*`, `analy*`, `audit*`, `check`, `checks`, `checking`, `checked` |
/// | testing | `test*` |
/// | documentation | `document*`, `doc`, `docs`, `readme` |
/// | refactoring | `refactor*`, `optimi*`, `restructur*`, `simplif*`, `cleanup` |
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

fn tokenize(command: &str) -> Vec<String> {
    command
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn any_prefix(tokens: &[String], prefixes: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| prefixes.iter().any(|prefix| token.starts_with(prefix)))
}

fn any_exact(tokens: &[String], words: &[&str]) -> bool {
    tokens.iter().any(|token| words.contains(&token.as_str()))
}

impl WorkflowClassifier for KeywordClassifier {
    fn classify(&self, command: &str) -> Option<String> {
        let tokens = tokenize(command);

        let workflow = if any_prefix(&tokens, &["implement", "create", "build"])
            || (any_exact(&tokens, &["add"]) && any_prefix(&tokens, &["feature"]))
        {
            IMPLEMENTATION
        } else if any_prefix(&tokens, &["review", "analy", "audit"])
            || any_exact(&tokens, &["check", "checks", "checking", "checked"])
        {
            REVIEW
        } else if any_prefix(&tokens, &["test"]) {
            TESTING
        } else if any_prefix(&tokens, &["document"]) || any_exact(&tokens, &["doc", "docs", "readme"])
        {
            DOCUMENTATION
        } else if any_prefix(&tokens, &["refactor", "optimi", "restructur", "simplif"])
            || any_exact(&tokens, &["cleanup"])
        {
            REFACTORING
        } else {
            return None;
        };

        Some(workflow.to_string())
    }
}
