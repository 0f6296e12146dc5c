//! Top-level leftest error type.

use thiserror::Error;

use super::{
    ContextError, ContextStoreError, ElementError, LocatorError, ScenarioError, StepError,
    TagError,
};

/// Top-level error type returned by authoring calls and generated runnables.
#[derive(Debug, Error)]
pub enum LeftestError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    #[error("Step error: {0}")]
    Step(#[from] StepError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Locator error: {0}")]
    Locator(#[from] LocatorError),

    #[error("Element error: {0}")]
    Element(#[from] ElementError),

    #[error("Context store error: {0}")]
    Store(#[from] ContextStoreError),

    /// A step implementation returned an error.
    #[error("Step {step:?} failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// A lifecycle hook returned an error.
    #[error("{hook} hook failed: {source}")]
    HookFailed {
        hook: String,
        #[source]
        source: anyhow::Error,
    },

    /// An async implementation was reached in a suite driven synchronously.
    #[error("{0} is async but the adapter runs synchronously")]
    AsyncInSyncSuite(String),

    #[error("Adapter error: {0}")]
    Adapter(String),
}

impl LeftestError {
    /// Returns true if this is the short-circuit error of a later step.
    pub fn is_previous_step_failed(&self) -> bool {
        matches!(self, LeftestError::Step(StepError::PreviousStepFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::ScenarioKind;

    #[test]
    fn test_context_error_is_transparent() {
        let err = LeftestError::from(ContextError::new("given", ScenarioKind::Scenario));
        assert_eq!(err.to_string(), "given can only be used in a scenario context");
    }

    #[test]
    fn test_step_error_from() {
        let err = LeftestError::from(StepError::NotFound("I fly".to_string()));
        assert!(err.to_string().contains("Step error"));
        assert!(err.to_string().contains("I fly"));
    }

    #[test]
    fn test_is_previous_step_failed() {
        let err = LeftestError::from(StepError::PreviousStepFailed);
        assert!(err.is_previous_step_failed());
        let other = LeftestError::Adapter("boom".to_string());
        assert!(!other.is_previous_step_failed());
    }

    #[test]
    fn test_step_failed_keeps_source() {
        let err = LeftestError::StepFailed {
            step: "I click".to_string(),
            source: anyhow::anyhow!("button missing"),
        };
        assert!(err.to_string().contains("button missing"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_debug() {
        let err = LeftestError::Adapter("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Adapter"));
    }
}
