//! Ambient test-context store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextStoreError {
    /// The key was read before being set in the current scenario.
    #[error("Test context value {0:?} is not set in the current scenario")]
    NotSet(String),

    #[error("Test context value {key:?} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_set_message() {
        let err = ContextStoreError::NotSet("user".to_string());
        assert!(err.to_string().contains("\"user\""));
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ContextStoreError::TypeMismatch {
            key: "count".to_string(),
            expected: "u32",
        };
        assert!(err.to_string().contains("u32"));
    }
}
