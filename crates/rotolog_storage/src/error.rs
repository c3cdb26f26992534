//! Error types for file-system operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for file-system operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during file-system operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The path does not exist.
    ///
    /// Kept apart from [`StorageError::Io`] so callers can skip absent
    /// files without string matching on OS errors.
    #[error("path not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file handle has already been closed.
    #[error("file is closed")]
    Closed,
}

impl StorageError {
    /// Creates a not-found error for `path`.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns true if this error means the path does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            Self::Closed => false,
        }
    }

    /// Maps an I/O error on `path`, turning `NotFound` into the typed variant.
    pub(crate) fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::not_found(path)
        } else {
            Self::Io(err)
        }
    }
}
