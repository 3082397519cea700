//! Storage Layer
//!
//! File-backed persistence for the two stateful resources of the monitor:
//!
//! - [`RegistryStore`]: the device registry as a single pretty-printed JSON
//!   document, rewritten in full on every mutation
//! - [`AvailabilityLog`]: an append-only delimited-text log of probe outcomes
//!
//! Both resources assume a single writer. No locking is performed; concurrent
//! `load -> mutate -> persist` sequences from separate processes race and the
//! last `persist` wins.

pub mod availability_log;
mod error;
pub mod registry_store;
mod types;

pub use availability_log::{AvailabilityLog, HEADER_ROW, RawRow};
pub use error::StorageError;
pub use registry_store::RegistryStore;
pub use types::{AvailabilityRecord, Device, DeviceId, TIMESTAMP_FORMAT};
