//! Configuration module for pingwatch.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Registry document path
//! - Availability log path and header handling
//! - Monitoring loop settings (interval, probe timeout, concurrency)

mod app;

pub use app::{AppConfig, ConfigError, LogConfig, MonitorConfig, expand_env_vars};
pub use app::{DEFAULT_LOG_PATH, DEFAULT_REGISTRY_PATH};
pub use crate::collector::DEFAULT_INTERVAL;
