//! Core collector traits and types.

use std::time::Duration;

use thiserror::Error;

use crate::registry::RegistryError;
use crate::storage::StorageError;

/// Minimum allowed interval (1 second).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Errors that end a monitoring cycle.
///
/// Probe failures never appear here; they are recorded as unreachable
/// outcomes instead.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The device registry could not be loaded.
    #[error("failed to load device registry: {0}")]
    Registry(#[from] RegistryError),

    /// The availability log could not be appended to.
    #[error("failed to record availability: {0}")]
    Storage(#[from] StorageError),

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Fixed delay between the end of one cycle and the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    interval: Duration,
}

impl Schedule {
    /// Create an interval schedule.
    ///
    /// Interval is clamped to a minimum of 1 second.
    pub fn interval(duration: Duration) -> Self {
        if duration < MIN_INTERVAL {
            tracing::warn!(min_interval = ?MIN_INTERVAL,
                "Interval duration is less than minimum allowed. Using minimum duration."
            );
            Self {
                interval: MIN_INTERVAL,
            }
        } else {
            Self { interval: duration }
        }
    }

    /// Delay between cycles.
    pub fn period(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "every {}", humantime::format_duration(self.interval))
    }
}

/// A single reachability check.
///
/// # Error Handling Philosophy
///
/// Implementations must absorb every failure of the check itself (timeout,
/// unreachable host, permission denied, malformed address, resolver errors)
/// and report it as `false`. Nothing escapes `probe`, which lets the monitor
/// produce exactly one record per device regardless of device health.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Check whether `address` answers. `true` means reachable.
    async fn probe(&self, address: &str) -> bool;
}
