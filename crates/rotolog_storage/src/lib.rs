//! # rotolog storage
//!
//! File-system capability for the rotolog rotation engine.
//!
//! The engine never touches `std::fs` directly. Everything it needs from
//! durable storage goes through the [`FileSystem`] and [`LogFile`] traits:
//!
//! - open-or-create for append, with permission bits
//! - stat, write, flush and close on an open handle
//! - rename and remove, with "does not exist" kept distinct from other errors
//!
//! ## Available File Systems
//!
//! - [`OsFileSystem`] - The real file system via `std::fs`
//! - [`InMemoryFileSystem`] - For testing
//!
//! ## Example
//!
//! ```rust
//! use rotolog_storage::{FileSystem, InMemoryFileSystem, LogFile};
//! use std::path::Path;
//!
//! let fs = InMemoryFileSystem::new();
//! let mut file = fs.open_append(Path::new("app.log"), 0o600).unwrap();
//! assert_eq!(file.write(b"hello world").unwrap(), 11);
//! assert_eq!(file.size().unwrap(), 11);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{FileSystem, LogFile};
pub use error::{StorageError, StorageResult};
pub use file::{OsFileSystem, OsLogFile};
pub use memory::{InMemoryFileSystem, InMemoryLogFile};
