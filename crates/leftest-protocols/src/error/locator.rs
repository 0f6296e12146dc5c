//! Locator resolution errors.

use thiserror::Error;

use super::ElementError;

#[derive(Debug, Error)]
pub enum LocatorError {
    /// No element matched any of the queries.
    #[error("Failed to find element matching one of the following queries:\n{0}")]
    NotFound(String),

    /// The requested number of matches was not reached before the timeout.
    #[error("Expected {expected} matches within {timeout_ms}ms, found {found}:\n{description}")]
    CountNotReached {
        description: String,
        expected: usize,
        found: usize,
        timeout_ms: u64,
    },

    /// A predicate failed while being evaluated.
    #[error("Predicate {description:?} failed: {message}")]
    Predicate { description: String, message: String },

    #[error("Element error: {0}")]
    Element(#[from] ElementError),
}
