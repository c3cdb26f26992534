//! Error types for the rotation engine.

use rotolog_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

use crate::record::FormatError;

/// Result type for engine operations.
pub type RotateResult<T> = Result<T, RotateError>;

/// Errors that can occur while writing or rotating a log file.
#[derive(Debug, Error)]
pub enum RotateError {
    /// The configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        message: String,
    },

    /// The live log file could not be opened, created or stat'ed.
    #[error("could not open log file {}: {source}", path.display())]
    Open {
        /// The live log path.
        path: PathBuf,
        /// The underlying storage error.
        source: StorageError,
    },

    /// A record could not be converted to bytes.
    #[error("could not convert log record to bytes: {0}")]
    Format(#[from] FormatError),

    /// A custom rotation predicate panicked.
    ///
    /// Dispatch treats this as "do not rotate" and still writes the record.
    #[error("rotation predicate failed: {message}")]
    Predicate {
        /// The panic message.
        message: String,
    },

    /// The live log file could not be closed before rotation.
    #[error("log file {} already closed: {source}", path.display())]
    Close {
        /// The live log path.
        path: PathBuf,
        /// The underlying storage error.
        source: StorageError,
    },

    /// A generation could not be renamed.
    #[error("could not rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        /// The generation being moved.
        from: PathBuf,
        /// Its destination.
        to: PathBuf,
        /// The underlying storage error.
        source: StorageError,
    },

    /// The oldest generation could not be removed.
    #[error("could not remove {}: {source}", path.display())]
    Remove {
        /// The generation being discarded.
        path: PathBuf,
        /// The underlying storage error.
        source: StorageError,
    },

    /// A record could not be written.
    #[error("could not write to log file {}: {source}", path.display())]
    Write {
        /// The live log path.
        path: PathBuf,
        /// The underlying storage error.
        source: StorageError,
    },

    /// Buffered data could not be flushed.
    #[error("could not flush log file {}: {source}", path.display())]
    Flush {
        /// The live log path.
        path: PathBuf,
        /// The underlying storage error.
        source: StorageError,
    },

    /// The lifetime signal has fired.
    #[error("rotating log is shut down")]
    ShutDown,

    /// The pause arbiter could not be started.
    #[error("could not start pause arbiter: {0}")]
    Arbiter(#[source] std::io::Error),
}

impl RotateError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a predicate failure error.
    pub fn predicate(message: impl Into<String>) -> Self {
        Self::Predicate {
            message: message.into(),
        }
    }

    /// Returns true if the engine has been shut down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        matches!(self, Self::ShutDown)
    }
}
