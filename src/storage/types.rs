//! Core data types for the storage layer.
//!
//! - [`Device`]: a monitored endpoint as stored in the registry document
//! - [`AvailabilityRecord`]: one probe outcome as appended to the availability log

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Caller-supplied device identifier, unique within the registry.
pub type DeviceId = i64;

/// Timestamp layout used in availability log rows (local time, microseconds).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A monitored network endpoint.
///
/// Documents written by older releases stored the probe target under `ip`;
/// that key is still accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Unique identifier.
    pub id: DeviceId,
    /// Display label.
    pub name: String,
    /// Hostname or IP literal used as the probe target.
    #[serde(alias = "ip")]
    pub address: String,
}

impl Device {
    /// Create a new device.
    pub fn new(id: DeviceId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{id: {}, name: {}, address: {}}}",
            self.id, self.name, self.address
        )
    }
}

/// An immutable reachability outcome for one device.
///
/// Written as one `device_id,timestamp,status` row, where `status` is `1`
/// for reachable and `0` for unreachable or probe error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRecord {
    /// Device the probe targeted.
    pub device_id: DeviceId,
    /// When the probe for this device completed.
    pub timestamp: DateTime<Local>,
    /// Whether the device answered.
    pub reachable: bool,
}

impl AvailabilityRecord {
    /// Create a record stamped with the current local time.
    pub fn now(device_id: DeviceId, reachable: bool) -> Self {
        Self {
            device_id,
            timestamp: Local::now(),
            reachable,
        }
    }

    /// Status column value: `1` reachable, `0` otherwise.
    pub fn status(&self) -> u8 {
        u8::from(self.reachable)
    }

    /// Render the record as its log columns in fixed order.
    pub fn to_row(&self) -> [String; 3] {
        [
            self.device_id.to_string(),
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.status().to_string(),
        ]
    }
}
