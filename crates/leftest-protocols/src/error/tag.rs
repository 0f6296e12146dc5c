//! Tag annotation misuse.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    /// Tags were queued for activation but the next call does not accept tags.
    #[error("{call} does not accept tags, but these tags were active: {}", .tags.join(", "))]
    Unexpected { call: String, tags: Vec<String> },

    /// A tag filter token could not be parsed.
    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),
}
