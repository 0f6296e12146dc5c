//! Scenario tree uniqueness violations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),

    #[error("Duplicate scenario name {name:?} in feature {feature:?}")]
    DuplicateScenario { feature: String, name: String },

    #[error("Duplicate examples name {name:?} in scenario {scenario:?}")]
    DuplicateExamples { scenario: String, name: String },

    #[error("Scenario {0:?} cannot mix unnamed examples with other examples")]
    MixedExamples(String),

    #[error("Example row {index} of scenario {scenario:?} is not an object")]
    InvalidExampleRow { scenario: String, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_scenario() {
        let err = ScenarioError::DuplicateScenario {
            feature: "Cart".to_string(),
            name: "add item".to_string(),
        };
        assert!(err.to_string().contains("add item"));
        assert!(err.to_string().contains("Cart"));
    }

    #[test]
    fn test_mixed_examples() {
        let err = ScenarioError::MixedExamples("outline".to_string());
        assert!(err.to_string().contains("unnamed examples"));
    }
}
