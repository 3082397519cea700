//! pingwatch - Lightweight Uptime Monitor
//!
//! Tracks a small set of network devices, probes their reachability on a fixed
//! interval, and appends the outcomes to a durable availability log. The
//! crate can be used as a library or run through the `pingwatch` binary.
//!
//! # Architecture
//!
//! - **Storage**: JSON registry document and append-only availability log
//! - **Registry**: Device CRUD with id uniqueness and partial updates
//! - **Collector**: ICMP probing and the monitoring loop
//! - **Config**: YAML configuration with environment expansion
//! - **CLI**: Management commands and interactive prompts
//!
//! # Example
//!
//! ```rust,no_run
//! use pingwatch::{AppConfig, Monitor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load("configs/config.yaml")?;
//!
//!     config.registry().add(1, "Router", "192.168.1.1")?;
//!
//!     let monitor = Monitor::new(
//!         config.registry(),
//!         config.availability_log(),
//!         config.monitor.prober(),
//!     )
//!     .with_schedule(config.monitor.schedule())
//!     .with_concurrency(config.monitor.concurrency);
//!
//!     monitor.run().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod collector;
pub mod config;
pub mod registry;
pub mod storage;

pub use collector::{Monitor, MonitorError, MonitorState, Prober, Schedule, ping::PingProber};
pub use config::{AppConfig, ConfigError};
pub use registry::{DeviceRegistry, RegistryError};
pub use storage::{
    AvailabilityLog, AvailabilityRecord, Device, DeviceId, RawRow, RegistryStore, StorageError,
};
