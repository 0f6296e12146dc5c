//! Authoring context violations.

use thiserror::Error;

use crate::flag::ScenarioKind;

/// An authoring call was made outside of its legal nesting.
#[derive(Debug, Error)]
#[error("{call} can only be used in a {expected} context")]
pub struct ContextError {
    /// Name of the offending call (`scenario`, `given`, ...).
    pub call: String,
    /// The context kind the call requires.
    pub expected: ScenarioKind,
}

impl ContextError {
    pub fn new(call: impl Into<String>, expected: ScenarioKind) -> Self {
        Self {
            call: call.into(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_error_message() {
        let err = ContextError::new("scenario", ScenarioKind::Feature);
        assert_eq!(err.to_string(), "scenario can only be used in a feature context");
    }

    #[test]
    fn test_context_error_root() {
        let err = ContextError::new("feature", ScenarioKind::Root);
        assert_eq!(err.to_string(), "feature can only be used in a root context");
    }
}
