//! File-system capability traits.

use crate::error::StorageResult;
use std::fmt;
use std::path::Path;

/// An open, append-only log file.
///
/// Handles are **opaque byte sinks**. They know nothing about log records,
/// generations or rotation; the engine owns all of that.
///
/// # Invariants
///
/// - `write` appends at the end of the file and returns the bytes written
/// - `size` reports the on-disk length, including bytes written by others
/// - after `close`, every operation returns [`crate::StorageError::Closed`]
pub trait LogFile: Send + fmt::Debug {
    /// Returns the current length of the file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is closed or cannot be stat'ed.
    fn size(&self) -> StorageResult<u64>;

    /// Appends `data` to the end of the file.
    ///
    /// Returns the number of bytes actually written, which may be less than
    /// `data.len()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is closed or an I/O error occurs.
    fn write(&mut self, data: &[u8]) -> StorageResult<usize>;

    /// Flushes buffered data to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is closed or the flush fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Flushes and releases the handle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::Closed`] if the handle was already
    /// closed, or an I/O error if the final flush fails.
    fn close(&mut self) -> StorageResult<()>;
}

/// The file-system operations the rotation engine needs.
///
/// # Invariants
///
/// - `rename` and `remove` report an absent source as
///   [`crate::StorageError::NotFound`], never as a generic I/O error
/// - implementations must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::OsFileSystem`] - the real file system
/// - [`super::InMemoryFileSystem`] - for testing
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Opens `path` for appending, creating it with permission bits `mode`
    /// if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or opened.
    fn open_append(&self, path: &Path, mode: u32) -> StorageResult<Box<dyn LogFile>>;

    /// Renames `from` to `to`, replacing `to` if it exists.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `from` does not exist, or an I/O error.
    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()>;

    /// Removes the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `path` does not exist, or an I/O error.
    fn remove(&self, path: &Path) -> StorageResult<()>;

    /// Creates `path` and all missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;
}
