//! Configuration loader.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

pub const CONFIG_FILE_NAME: &str = "leftest.toml";

/// Directory under the user configuration directory searched by
/// [`ConfigLoader::discover`].
pub const CONFIG_DIR_NAME: &str = "leftest";

/// Environment variable overriding `[tags] filter`.
pub const TAGS_ENV_VAR: &str = "LEFTEST_TAGS";

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Discover, load and apply environment overrides.
    ///
    /// Falls back to defaults when no file is found.
    pub fn load_default() -> Result<Config, ConfigError> {
        let cwd = std::env::current_dir()?;
        let config_dir = dirs::config_dir();
        let mut config = match Self::discover_in(&cwd, config_dir.as_deref()) {
            Some(path) => Self::load(&path)?,
            None => Config::default(),
        };
        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// First `leftest.toml` in the working directory or the user
    /// configuration directory.
    pub fn discover() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_in(&cwd, dirs::config_dir().as_deref())
    }

    pub fn discover_in(working_dir: &Path, config_dir: Option<&Path>) -> Option<PathBuf> {
        let local = working_dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        config_dir
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(filter) = lookup(TAGS_ENV_VAR) {
            config.tags.filter = Some(filter);
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_PATTERN.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
