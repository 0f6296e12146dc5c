//! # Leftest Config
//!
//! Loading and validation of `leftest.toml`.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{ConfigLoader, CONFIG_DIR_NAME, CONFIG_FILE_NAME, TAGS_ENV_VAR};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
