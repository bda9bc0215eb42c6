//! Configuration loading.
//!
//! Settings come from an optional YAML file, chosen by `--config` or the
//! `TOWERDEX_CONFIG` environment variable. Every key is optional; unknown
//! keys are rejected so typos surface instead of being ignored.
//!
//! ```yaml
//! cache:
//!   stale_time: 300000        # ms
//!   lookup_stale_time: 3600000
//! booster_page_size: 50
//! search_debounce_ms: 300
//! output: text
//! operator:
//!   email: operator@localhost
//!   role: admin
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use towerdex_catalog::{CacheConfig, Role};

use crate::output::OutputMode;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TOWERDEX_CONFIG";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The account the command line acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Operator {
    pub email: String,
    pub role: Role,
}

impl Default for Operator {
    fn default() -> Self {
        Operator {
            email: "operator@localhost".to_string(),
            role: Role::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cache: CacheConfig,
    /// Rows per page on the booster screen.
    pub booster_page_size: usize,
    /// Quiet interval before typed search text is applied.
    pub search_debounce_ms: u64,
    /// Output mode when `--output` is not given.
    pub output: OutputMode,
    pub operator: Operator,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache: CacheConfig::default(),
            booster_page_size: 50,
            search_debounce_ms: 300,
            output: OutputMode::Text,
            operator: Operator::default(),
        }
    }
}

impl Config {
    /// Loads `path`, else the file named by `TOWERDEX_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        // An empty file is an empty mapping, not an error.
        let config: Config = if text.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.booster_page_size == 0 {
            return Err(ConfigError::Invalid(
                "booster_page_size must be at least 1".into(),
            ));
        }
        if self.cache.stale_time.is_zero() {
            return Err(ConfigError::Invalid("cache.stale_time must be positive".into()));
        }
        if !self.operator.email.contains('@') {
            return Err(ConfigError::Invalid(format!(
                "operator.email '{}' is not an email address",
                self.operator.email
            )));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn defaults_match_the_screens() {
        let config = Config::default();
        assert_eq!(config.booster_page_size, 50);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.cache.stale_time, Duration::from_secs(300));
        assert_eq!(config.cache.lookup_stale_time, Duration::from_secs(3600));
        assert_eq!(config.operator.role, Role::Admin);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_yaml("booster_page_size: 20\ncache:\n  stale_time: 1000\n").unwrap();
        assert_eq!(config.booster_page_size, 20);
        assert_eq!(config.cache.stale_time, Duration::from_secs(1));
        assert_eq!(config.cache.lookup_stale_time, Duration::from_secs(3600));
        assert_eq!(config.output, OutputMode::Text);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_yaml("booster_pagesize: 20\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("booster_pagesize"));
    }

    #[test]
    fn zero_page_size_is_invalid() {
        assert!(matches!(
            Config::from_yaml("booster_page_size: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_yaml("\n").unwrap(), Config::default());
    }

    #[test]
    #[serial]
    fn explicit_path_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.yaml");
        let from_env = dir.path().join("env.yaml");
        std::fs::write(&explicit, "output: json\n").unwrap();
        std::fs::write(&from_env, "output: csv\n").unwrap();

        std::env::set_var(CONFIG_ENV, &from_env);
        assert_eq!(Config::load(Some(explicit.as_path())).unwrap().output, OutputMode::Json);
        assert_eq!(Config::load(None).unwrap().output, OutputMode::Csv);
        std::env::remove_var(CONFIG_ENV);
    }

    #[test]
    #[serial]
    fn no_path_and_no_env_is_default() {
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    #[serial]
    fn read_errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output: [json").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected a parse error, got {other:?}"),
        }

        let missing = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
