//! Wires a loaded configuration into suites, environments and the selector DSL.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use leftest_config::{Config, ConfigError, ConfigLoader, ConfigValidator};
use leftest_core::{StepRegistry, TagSelection, TestSuite};
use leftest_harness::{
    selector, EnvironmentBackend, EnvironmentOptions, HarnessEnvironment,
};
use leftest_protocols::TestSuiteAdapter;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validated configuration plus the factories that depend on it.
#[derive(Debug, Clone)]
pub struct Leftest {
    config: Config,
}

impl Leftest {
    /// Discover `leftest.toml`, apply `LEFTEST_TAGS` and validate.
    pub fn load() -> Result<Self, BootstrapError> {
        Self::from_config(ConfigLoader::load_default()?)
    }

    /// Load a specific file, apply `LEFTEST_TAGS` and validate.
    pub fn load_from(path: &Path) -> Result<Self, BootstrapError> {
        let mut config = ConfigLoader::load(path)?;
        ConfigLoader::apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Self::from_config(config)
    }

    /// Validate `config` and apply its selector attributes process-wide.
    pub fn from_config(config: Config) -> Result<Self, BootstrapError> {
        let warnings = ConfigValidator::validate(&config).into_result()?;
        for warning in &warnings {
            warn!(path = %warning.path, "{}", warning.message);
        }

        selector::set_test_id_attribute(config.harness.test_id_attribute.clone());
        selector::set_component_attribute(config.harness.component_attribute.clone());
        info!(
            tags = ?config.tags.filter,
            wait_timeout_ms = config.harness.wait_timeout_ms,
            "Configuration loaded"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Install the tracing subscriber described by `[logging]`.
    pub fn init_logging(&self) -> bool {
        crate::logging::init(&self.config.logging)
    }

    /// Selection from `[tags] filter`, empty when unset.
    pub fn tag_selection(&self) -> TagSelection {
        self.config
            .tags
            .filter
            .as_deref()
            .map(TagSelection::parse)
            .unwrap_or_default()
    }

    pub fn environment_options(&self) -> EnvironmentOptions {
        EnvironmentOptions {
            wait_timeout: self.config.harness.wait_timeout(),
        }
    }

    /// Suite using the configured tag selection.
    pub fn suite(&self, steps: StepRegistry, adapter: Arc<dyn TestSuiteAdapter>) -> TestSuite {
        TestSuite::with_selection(steps, adapter, self.tag_selection())
    }

    /// Environment over `backend` using the configured wait budget.
    pub fn environment<B: EnvironmentBackend>(&self, backend: B) -> Arc<HarnessEnvironment<B>> {
        HarnessEnvironment::with_options(backend, self.environment_options())
    }
}
