// Configuration
//
// Settings come from a TOML file, then `TENANT_LEDGER_*` environment
// variables, then command-line flags (applied by the binary), each layer
// overriding the previous one.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "TENANT_LEDGER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TENANT_LEDGER_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "TENANT_LEDGER_LOG_LEVEL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the tenant/transaction API lives
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file for the dashboard (the terminal belongs to the UI)
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Configured file, or `tenant-ledger.log` in the platform data dir.
    pub fn file_path(&self) -> PathBuf {
        match &self.file {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .map(|p| p.join("tenant-ledger").join("tenant-ledger.log"))
                .unwrap_or_else(|| PathBuf::from("tenant-ledger.log")),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load an explicitly requested file, or the first default location that
    /// exists, then apply environment overrides.
    ///
    /// A missing explicit file is an error; missing default files are not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_locations().into_iter().find(|p| p.exists()) {
                Some(path) => {
                    tracing::debug!("Loading config from {:?}", path);
                    Self::load(&path)?
                }
                None => Config::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `TENANT_LEDGER_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            match timeout.parse() {
                Ok(secs) => self.api.request_timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT_SECS, timeout),
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tenant-ledger").join("config.toml"));
    }
    paths.push(PathBuf::from("./tenant-ledger.toml"));
    paths
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tenant Ledger configuration
#
# Environment variables override these settings:
# - TENANT_LEDGER_API_URL
# - TENANT_LEDGER_TIMEOUT_SECS
# - TENANT_LEDGER_LOG_LEVEL

[api]
# Base URL of the property management API (serves /api/tenants/ and /api/transactions/)
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Dashboard log file (defaults to the platform data directory)
# file = "/tmp/tenant-ledger.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://api.internal:9000\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://api.internal:9000");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = Config::resolve(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://override:1234"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_LOG_LEVEL, "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://override:1234");
        assert_eq!(config.api.request_timeout_secs, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_timeout_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert_eq!(config.api.request_timeout_secs, 10);
    }

    #[test]
    fn test_log_file_override() {
        let logging = LoggingConfig {
            level: "info".to_string(),
            file: Some("/tmp/ledger.log".to_string()),
        };
        assert_eq!(logging.file_path(), PathBuf::from("/tmp/ledger.log"));
    }
}
