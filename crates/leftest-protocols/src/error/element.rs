//! Element interaction errors reported by runner backends.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementError {
    #[error("Element is no longer attached")]
    Detached,

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
