//! Registry Integration Tests for pingwatch
//!
//! Scenario coverage for the device registry through its public API.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use pingwatch::{Device, DeviceRegistry, RegistryError};

// =============================================================================
// Test Helpers
// =============================================================================

/// Registry over a fresh document in a temporary directory.
fn create_registry() -> (tempfile::TempDir, DeviceRegistry) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let registry = DeviceRegistry::open(dir.path().join("device_data.json"));
    (dir, registry)
}

/// Raw document bytes plus modification time, to detect writes.
fn snapshot(path: &Path) -> (Vec<u8>, SystemTime) {
    let bytes = fs::read(path).expect("Failed to read registry document");
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .expect("Failed to read mtime");
    (bytes, modified)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_add_to_empty_registry() {
    let (_dir, registry) = create_registry();

    let device = registry.add(1, "Router", "192.168.1.1").unwrap();

    assert_eq!(device, Device::new(1, "Router", "192.168.1.1"));
    assert_eq!(registry.list().unwrap(), vec![device]);
}

#[test]
fn test_duplicate_add_leaves_document_untouched() {
    let (_dir, registry) = create_registry();
    registry.add(1, "Router", "192.168.1.1").unwrap();
    let before = snapshot(registry.store().path());

    let err = registry.add(1, "Router2", "10.0.0.1").unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateId(1)));
    assert_eq!(snapshot(registry.store().path()), before);
}

#[test]
fn test_update_address_only() {
    let (_dir, registry) = create_registry();
    registry.add(1, "Router", "192.168.1.1").unwrap();

    registry.update(1, "", "10.0.0.2").unwrap();

    assert_eq!(
        registry.find(1).unwrap(),
        Some(Device::new(1, "Router", "10.0.0.2"))
    );
}

#[test]
fn test_update_with_empty_fields_still_persists() {
    let (_dir, registry) = create_registry();
    registry.add(1, "Router", "192.168.1.1").unwrap();
    let path = registry.store().path().to_path_buf();
    fs::File::options()
        .write(true)
        .open(&path)
        .and_then(|f| f.set_modified(SystemTime::UNIX_EPOCH))
        .expect("Failed to backdate registry document");
    let (bytes_before, modified_before) = snapshot(&path);
    assert_eq!(modified_before, SystemTime::UNIX_EPOCH);

    let device = registry.update(1, "", "").unwrap();

    assert_eq!(device, Device::new(1, "Router", "192.168.1.1"));
    let (bytes_after, modified_after) = snapshot(&path);
    assert_eq!(bytes_after, bytes_before);
    assert!(
        modified_after > modified_before,
        "document should be rewritten even when nothing changed"
    );
}

#[test]
fn test_delete_missing_id_does_not_write() {
    let (_dir, registry) = create_registry();
    registry.add(1, "Router", "192.168.1.1").unwrap();
    let before = snapshot(registry.store().path());

    let err = registry.delete(99).unwrap_err();

    assert!(matches!(err, RegistryError::NotFound(99)));
    assert!(err.is_recoverable());
    assert_eq!(snapshot(registry.store().path()), before);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_ids_stay_unique_across_adds() {
    let (_dir, registry) = create_registry();

    for (id, name) in [(1, "a"), (2, "b"), (1, "c"), (3, "d"), (2, "e")] {
        let _ = registry.add(id, name, "10.0.0.1");
    }

    let ids: Vec<_> = registry.list().unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[test]
fn test_operations_see_external_edits() {
    let (_dir, registry) = create_registry();
    registry.add(1, "Router", "192.168.1.1").unwrap();

    // Another process rewrites the document between calls.
    fs::write(
        registry.store().path(),
        r#"[{"id": 5, "name": "Camera", "ip": "192.168.1.50"}]"#,
    )
    .unwrap();

    assert_eq!(registry.find(1).unwrap(), None);
    assert_eq!(
        registry.find(5).unwrap(),
        Some(Device::new(5, "Camera", "192.168.1.50"))
    );
}

#[test]
fn test_second_handle_observes_mutations() {
    let (dir, registry) = create_registry();
    let other = DeviceRegistry::open(dir.path().join("device_data.json"));

    registry.add(1, "Router", "192.168.1.1").unwrap();
    other.add(2, "Switch", "192.168.1.2").unwrap();

    assert_eq!(registry.list().unwrap().len(), 2);
}
