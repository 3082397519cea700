//! Application configuration structures.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::ping::{DEFAULT_TIMEOUT, PingProber};
use crate::collector::{DEFAULT_CONCURRENCY, DEFAULT_INTERVAL, Schedule};
use crate::registry::DeviceRegistry;
use crate::storage::AvailabilityLog;

/// `${NAME}` or `${NAME:-fallback}`.
static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("env reference pattern is valid")
});

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Constants
// =============================================================================

/// Default registry document path.
pub const DEFAULT_REGISTRY_PATH: &str = "device_data.json";

/// Default availability log path.
pub const DEFAULT_LOG_PATH: &str = "device_availability_data.csv";

// =============================================================================
// Availability Log Configuration
// =============================================================================

/// Availability log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path (default: "device_availability_data.csv").
    pub path: PathBuf,

    /// Treat the first row as a header (default: false).
    pub header: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            header: false,
        }
    }
}

// =============================================================================
// Monitor Configuration
// =============================================================================

/// Monitoring loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Delay between cycles (default: 5m, minimum: 1s).
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Per-probe timeout (default: 4s).
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,

    /// Maximum probes in flight per cycle (default: 16).
    pub concurrency: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            probe_timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl MonitorConfig {
    /// Cycle schedule derived from `interval`.
    pub fn schedule(&self) -> Schedule {
        Schedule::interval(self.interval)
    }

    /// ICMP prober using `probe_timeout`.
    pub fn prober(&self) -> PingProber {
        PingProber::new(self.probe_timeout)
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Registry document path (default: "device_data.json").
    pub registry_path: PathBuf,

    /// Availability log configuration.
    pub log: LogConfig,

    /// Monitoring loop configuration.
    pub monitor: MonitorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            log: LogConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded before parsing.
    /// An empty file yields the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content);
        let config: Self = if expanded.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&expanded)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "registry_path cannot be empty".to_string(),
            ));
        }

        if self.log.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "log path cannot be empty".to_string(),
            ));
        }

        if self.log.path == self.registry_path {
            return Err(ConfigError::Invalid(format!(
                "log path and registry_path must differ: '{}'",
                self.log.path.display()
            )));
        }

        if self.monitor.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "monitor probe_timeout must be positive".to_string(),
            ));
        }

        if self.monitor.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "monitor concurrency must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Device registry over `registry_path`.
    pub fn registry(&self) -> DeviceRegistry {
        DeviceRegistry::open(&self.registry_path)
    }

    /// Availability log over `log.path`.
    pub fn availability_log(&self) -> AvailabilityLog {
        AvailabilityLog::new(&self.log.path).with_header(self.log.header)
    }
}

/// Substitute `${NAME}` and `${NAME:-fallback}` references from the process
/// environment. An unset name without a fallback becomes the empty string.
pub fn expand_env_vars(input: &str) -> String {
    ENV_REFERENCE
        .replace_all(input, |caps: &Captures| match std::env::var(&caps[1]) {
            Ok(value) => value,
            Err(_) => caps.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.registry_path, PathBuf::from("device_data.json"));
        assert_eq!(config.log.path, PathBuf::from("device_availability_data.csv"));
        assert!(!config.log.header);
        assert_eq!(config.monitor.interval, Duration::from_secs(300));
        assert_eq!(config.monitor.probe_timeout, Duration::from_secs(4));
        assert_eq!(config.monitor.concurrency, 16);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let config = AppConfig::from_yaml("\n").unwrap();
        assert_eq!(config.monitor.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
registry_path: /var/lib/pingwatch/devices.json
monitor:
  interval: 1m
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(
            config.registry_path,
            PathBuf::from("/var/lib/pingwatch/devices.json")
        );
        assert_eq!(config.monitor.interval, Duration::from_secs(60));
        assert_eq!(config.monitor.probe_timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.log.path, PathBuf::from(DEFAULT_LOG_PATH));
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
registry_path: devices.json
log:
  path: availability.csv
  header: true
monitor:
  interval: 30s
  probe_timeout: 500ms
  concurrency: 4
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert!(config.log.header);
        assert_eq!(config.monitor.probe_timeout, Duration::from_millis(500));
        assert_eq!(config.monitor.concurrency, 4);
        assert_eq!(config.monitor.schedule().period(), Duration::from_secs(30));
        assert_eq!(config.monitor.prober().timeout(), Duration::from_millis(500));
        assert!(config.availability_log().has_header());
    }

    #[test]
    fn test_yaml_env_expansion() {
        let yaml = "registry_path: ${PINGWATCH_TEST_UNSET_DIR_98765:-/tmp}/devices.json\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.registry_path, PathBuf::from("/tmp/devices.json"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = AppConfig::from_yaml("monitor:\n  concurrency: 0\n").unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::from_yaml("monitor:\n  probe_timeout: 0s\n").unwrap_err();
        assert!(err.to_string().contains("probe_timeout"));
    }

    #[test]
    fn test_same_paths_rejected() {
        let yaml = "registry_path: data.txt\nlog:\n  path: data.txt\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = AppConfig::from_yaml("monitor: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/pingwatch.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/pingwatch.yaml"));
    }

    #[test]
    fn test_expand_env_vars_passthrough() {
        assert_eq!(expand_env_vars("device_data.json"), "device_data.json");
    }

    #[test]
    fn test_expand_env_vars_fallback() {
        assert_eq!(
            expand_env_vars("${PINGWATCH_UNSET_VAR_12345:-/srv}/log.csv"),
            "/srv/log.csv"
        );
        assert_eq!(expand_env_vars("a${PINGWATCH_UNSET_VAR_54321}b"), "ab");
    }

    #[test]
    fn test_expand_env_vars_from_env() {
        // SAFETY: only this test touches this variable.
        unsafe {
            std::env::set_var("PINGWATCH_TEST_DATA_DIR", "/data");
        }
        let result = expand_env_vars("${PINGWATCH_TEST_DATA_DIR:-/srv}/devices.json");
        // SAFETY: see above.
        unsafe {
            std::env::remove_var("PINGWATCH_TEST_DATA_DIR");
        }
        assert_eq!(result, "/data/devices.json");
    }
}
