use super::*;

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_empty_attribute() {
    let mut config = Config::default();
    config.harness.test_id_attribute = "  ".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "harness.test_id_attribute"));
}

#[test]
fn test_validate_attribute_with_quotes() {
    let mut config = Config::default();
    config.harness.component_attribute = "data-\"x".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "harness.component_attribute"));
}

#[test]
fn test_validate_zero_timeout() {
    let mut config = Config::default();
    config.harness.wait_timeout_ms = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "harness.wait_timeout_ms"));
}

#[test]
fn test_validate_high_timeout_warning() {
    let mut config = Config::default();
    config.harness.wait_timeout_ms = 120_000;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_validate_tag_tokens() {
    let mut config = Config::default();
    config.tags.filter = Some("smoke, ^slow".to_string());
    assert!(ConfigValidator::validate(&config).is_valid());

    config.tags.filter = Some("smoke,^".to_string());
    assert!(!ConfigValidator::validate(&config).is_valid());

    config.tags.filter = Some("a^b".to_string());
    assert!(!ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_validate_unknown_log_level() {
    let mut config = Config::default();
    config.logging.level = "verbose".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "logging.level"));

    config.logging.level = "leftest_core=debug".to_string();
    assert!(ConfigValidator::validate(&config).warnings.is_empty());
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.harness.wait_timeout_ms = 0;
    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(err.to_string().contains("harness.wait_timeout_ms"));

    let warnings = ConfigValidator::validate(&Config::default()).into_result().unwrap();
    assert!(warnings.is_empty());
}
