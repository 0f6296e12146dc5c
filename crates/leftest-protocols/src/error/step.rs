//! Step registry and step execution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("Step not found: {0}")]
    NotFound(String),

    #[error("Ambiguous step definitions: {}", .0.join(" | "))]
    Ambiguous(Vec<String>),

    #[error("Missing arguments for step {step:?}: {}", .names.join(", "))]
    MissingArguments { step: String, names: Vec<String> },

    #[error("Step {step:?} expects {expected} arguments, got {actual}")]
    InsufficientArguments {
        step: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid literal in step: [{0}]")]
    InvalidLiteral(String),

    #[error("Invalid argument {index} for step {step:?}: {message}")]
    InvalidArgument {
        step: String,
        index: usize,
        message: String,
    },

    #[error("Previous step failed")]
    PreviousStepFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_step_failed_message() {
        assert_eq!(StepError::PreviousStepFailed.to_string(), "Previous step failed");
    }

    #[test]
    fn test_ambiguous_lists_templates() {
        let err = StepError::Ambiguous(vec!["a <x>".to_string(), "a <y>".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("a <x>"));
        assert!(msg.contains("a <y>"));
    }

    #[test]
    fn test_missing_arguments() {
        let err = StepError::MissingArguments {
            step: "I have <count> <fruit>".to_string(),
            names: vec!["count".to_string(), "fruit".to_string()],
        };
        assert!(err.to_string().contains("count, fruit"));
    }

    #[test]
    fn test_insufficient_arguments() {
        let err = StepError::InsufficientArguments {
            step: "x".to_string(),
            expected: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("expects 2 arguments, got 1"));
    }
}
