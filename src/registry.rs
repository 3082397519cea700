//! Device Registry
//!
//! CRUD operations over the device list. Every operation starts by reloading
//! the registry document and every successful mutation persists the whole
//! document again: `load -> mutate -> persist` is the transactional boundary.
//! Nothing is cached between calls.
//!
//! Lookups are a linear scan over the loaded sequence; registries hold tens of
//! devices, and an index would have to be rebuilt on every call anyway.

use std::path::Path;

use thiserror::Error;

use crate::storage::{Device, DeviceId, RegistryStore, StorageError};

/// Errors returned by [`DeviceRegistry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Name or address missing on add.
    #[error("device name or address is not provided")]
    Validation,

    /// Add targeted an id that is already registered.
    #[error("device with id {0} already exists")]
    DuplicateId(DeviceId),

    /// Update or delete targeted an id that is not registered.
    #[error("device with id {0} not found")]
    NotFound(DeviceId),

    /// The registry document could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RegistryError {
    /// Whether the caller can carry on after reporting this error.
    ///
    /// Only storage failures are fatal; the registry is left unchanged by all
    /// other variants.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// CRUD facade over the registry document.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    store: RegistryStore,
}

impl DeviceRegistry {
    /// Create a registry over the given store.
    pub fn new(store: RegistryStore) -> Self {
        Self { store }
    }

    /// Create a registry over the document at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(RegistryStore::new(path))
    }

    /// Underlying document store.
    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// All devices in document order.
    pub fn list(&self) -> Result<Vec<Device>, RegistryError> {
        Ok(self.store.load()?)
    }

    /// The device with `id`, if registered.
    pub fn find(&self, id: DeviceId) -> Result<Option<Device>, RegistryError> {
        Ok(self.store.load()?.into_iter().find(|d| d.id == id))
    }

    /// Register a new device and persist the registry.
    ///
    /// # Errors
    /// - `RegistryError::Validation` if `name` or `address` is empty
    /// - `RegistryError::DuplicateId` if `id` is already registered
    ///
    /// In both cases the document is not written.
    pub fn add(&self, id: DeviceId, name: &str, address: &str) -> Result<Device, RegistryError> {
        if name.is_empty() || address.is_empty() {
            return Err(RegistryError::Validation);
        }

        let mut devices = self.store.load()?;
        if position(&devices, id).is_some() {
            return Err(RegistryError::DuplicateId(id));
        }

        let device = Device::new(id, name, address);
        devices.push(device.clone());
        self.store.persist(&devices)?;

        tracing::info!(device_id = id, name, address, "Device added");
        Ok(device)
    }

    /// Update fields of a registered device and persist the registry.
    ///
    /// An empty `name` or `address` leaves that field unchanged; a field can
    /// therefore never be cleared through this operation. Any non-empty
    /// value, whitespace included, is applied as given. The document is
    /// rewritten even when both arguments are empty.
    ///
    /// # Errors
    /// Returns `RegistryError::NotFound` without writing if `id` is absent.
    pub fn update(
        &self,
        id: DeviceId,
        name: &str,
        address: &str,
    ) -> Result<Device, RegistryError> {
        let mut devices = self.store.load()?;
        let index = position(&devices, id).ok_or(RegistryError::NotFound(id))?;

        let device = &mut devices[index];
        if !name.is_empty() {
            device.name = name.to_owned();
        }
        if !address.is_empty() {
            device.address = address.to_owned();
        }
        let updated = device.clone();

        self.store.persist(&devices)?;

        tracing::info!(
            device_id = id,
            name = %updated.name,
            address = %updated.address,
            "Device updated"
        );
        Ok(updated)
    }

    /// Remove a registered device and persist the registry.
    ///
    /// # Errors
    /// Returns `RegistryError::NotFound` without writing if `id` is absent.
    pub fn delete(&self, id: DeviceId) -> Result<Device, RegistryError> {
        let mut devices = self.store.load()?;
        let index = position(&devices, id).ok_or(RegistryError::NotFound(id))?;

        let removed = devices.remove(index);
        self.store.persist(&devices)?;

        tracing::info!(device_id = id, "Device deleted");
        Ok(removed)
    }
}

fn position(devices: &[Device], id: DeviceId) -> Option<usize> {
    devices.iter().position(|d| d.id == id)
}
