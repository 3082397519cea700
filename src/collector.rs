//! Collector Layer
//!
//! Reachability probing and the monitoring loop that records its results.
//!
//! # Architecture
//!
//! - [`Prober`]: Core trait for a single reachability check
//! - [`PingProber`](ping::PingProber): ICMP echo implementation
//! - [`Monitor`]: Probes every registered device on a fixed [`Schedule`] and
//!   appends one batch of availability records per cycle
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use pingwatch::collector::{Monitor, Schedule, ping::PingProber};
//! use pingwatch::{AvailabilityLog, DeviceRegistry};
//!
//! # async fn run() -> Result<(), pingwatch::collector::MonitorError> {
//! let monitor = Monitor::new(
//!     DeviceRegistry::open("device_data.json"),
//!     AvailabilityLog::new("device_availability_data.csv"),
//!     PingProber::new(Duration::from_secs(4)),
//! )
//! .with_schedule(Schedule::interval(Duration::from_secs(300)));
//!
//! monitor.run().await
//! # }
//! ```

mod monitor;
pub mod ping;
mod traits;

pub use monitor::{CycleReport, DEFAULT_CONCURRENCY, DEFAULT_INTERVAL, Monitor, MonitorState};
pub use traits::{MIN_INTERVAL, MonitorError, Prober, Schedule};
