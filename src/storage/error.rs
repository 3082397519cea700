//! Storage-specific error types.
//!
//! All storage operations return [`StorageError`] on failure. Every variant
//! carries the path of the backing file so the outer driver can report which
//! resource became unusable.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read, created, or written.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The registry document is not valid JSON or has the wrong shape.
    #[error("malformed registry document '{}': {source}", path.display())]
    Json {
        /// Backing file.
        path: PathBuf,
        /// Underlying decode/encode failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
