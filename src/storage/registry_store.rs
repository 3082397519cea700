//! Registry document storage.
//!
//! The registry is a single JSON array of `{id, name, address}` objects.
//! [`RegistryStore::persist`] always replaces the whole document; there is no
//! incremental update path.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::storage::{Device, StorageError};

/// Indentation used for the pretty-printed document.
const INDENT: &[u8] = b"    ";

/// Load/overwrite primitives for the registry document.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Create a store backed by the document at `path`.
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the document, preserving file order.
    ///
    /// An absent file or one holding only whitespace decodes to an empty
    /// registry so a first run can bootstrap.
    ///
    /// # Errors
    /// Returns `StorageError::Io` if the file exists but cannot be read, and
    /// `StorageError::Json` if its content is not a device array.
    pub fn load(&self) -> Result<Vec<Device>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    "Registry document absent, starting empty"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::json(&self.path, e))
    }

    /// Serialize `devices` and replace the document with the result.
    ///
    /// The new content is written to a sibling temporary file which is then
    /// renamed over the document, so a crash never leaves a half-written
    /// registry behind.
    ///
    /// # Errors
    /// Returns `StorageError` on any encoding or I/O failure.
    pub fn persist(&self, devices: &[Device]) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        devices
            .serialize(&mut ser)
            .map_err(|e| StorageError::json(&self.path, e))?;
        buf.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let tmp_path = self.tmp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&buf)?;
            file.sync_all()
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::io(&tmp_path, e));
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            devices = devices.len(),
            "Registry document persisted"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
