//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// The first error as a [`ConfigError`], if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_tags(config, &mut result);
        Self::validate_harness(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_tags(config: &Config, result: &mut ValidationResult) {
        let Some(filter) = &config.tags.filter else {
            return;
        };
        for token in filter.split(|c: char| c == ',' || c.is_whitespace()) {
            if token == "^" {
                result.add_error(ValidationError::new(
                    "tags.filter",
                    "Exclusion marker '^' must be followed by a tag name",
                ));
            } else if token.chars().skip(1).any(|c| c == '^') {
                result.add_error(ValidationError::new(
                    "tags.filter",
                    format!("Malformed tag token '{}'", token),
                ));
            }
        }
    }

    fn validate_harness(config: &Config, result: &mut ValidationResult) {
        let harness = &config.harness;
        for (path, name) in [
            ("harness.test_id_attribute", &harness.test_id_attribute),
            ("harness.component_attribute", &harness.component_attribute),
        ] {
            if name.trim().is_empty() {
                result.add_error(ValidationError::new(path, "Attribute name cannot be empty"));
            } else if name.chars().any(|c| c.is_whitespace() || "\"'[]=".contains(c)) {
                result.add_error(ValidationError::new(
                    path,
                    format!("'{}' is not a valid attribute name", name),
                ));
            }
        }

        if harness.wait_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "harness.wait_timeout_ms",
                "wait_timeout_ms must be greater than 0",
            ));
        }

        if harness.wait_timeout_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "harness.wait_timeout_ms",
                "wait_timeout_ms is very high (>60s), failing lookups will be slow",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        // Directive strings like "leftest=debug" are passed through to the filter.
        if !level.contains('=') && !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
