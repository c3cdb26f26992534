//! In-memory file system for testing.

use crate::backend::{FileSystem, LogFile};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inode {
    data: Vec<u8>,
    mode: u32,
}

type InodeRef = Arc<RwLock<Inode>>;

/// An in-memory file system.
///
/// Paths map to shared inodes, so an open handle keeps writing to the same
/// data after its path has been renamed, as it would on a POSIX file system.
/// Directories are not modelled.
///
/// Cloning is cheap and every clone sees the same files, which lets a test
/// keep a handle for inspection while the engine owns another.
///
/// # Example
///
/// ```rust
/// use rotolog_storage::{FileSystem, InMemoryFileSystem, LogFile};
/// use std::path::Path;
///
/// let fs = InMemoryFileSystem::new();
/// let mut file = fs.open_append(Path::new("app.log"), 0o600).unwrap();
/// file.write(b"test data").unwrap();
/// assert_eq!(fs.contents(Path::new("app.log")).unwrap(), b"test data");
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, InodeRef>>>,
}

impl InMemoryFileSystem {
    /// Creates a new empty file system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces the file at `path` with `data`.
    ///
    /// Useful for seeding pre-existing logs and generations.
    pub fn write_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        let inode = Inode {
            data: data.into(),
            mode: 0o644,
        };
        self.files
            .write()
            .insert(path.into(), Arc::new(RwLock::new(inode)));
    }

    /// Returns true if a file exists at `path`.
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    /// Returns a copy of the file contents at `path`.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().get(path).map(|inode| inode.read().data.clone())
    }

    /// Returns the permission bits the file at `path` was created with.
    #[must_use]
    pub fn mode(&self, path: &Path) -> Option<u32> {
        self.files.read().get(path).map(|inode| inode.read().mode)
    }

    /// Returns all file paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl FileSystem for InMemoryFileSystem {
    fn open_append(&self, path: &Path, mode: u32) -> StorageResult<Box<dyn LogFile>> {
        let mut files = self.files.write();
        let inode = files
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                Arc::new(RwLock::new(Inode {
                    data: Vec::new(),
                    mode,
                }))
            })
            .clone();

        Ok(Box::new(InMemoryLogFile { inode: Some(inode) }))
    }

    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        let mut files = self.files.write();
        let inode = files
            .remove(from)
            .ok_or_else(|| StorageError::not_found(from))?;
        files.insert(to.to_path_buf(), inode);
        Ok(())
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        self.files
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(path))
    }

    fn create_dir_all(&self, _path: &Path) -> StorageResult<()> {
        Ok(())
    }
}

/// A handle on an in-memory inode.
#[derive(Debug)]
pub struct InMemoryLogFile {
    inode: Option<InodeRef>,
}

impl InMemoryLogFile {
    fn inode(&self) -> StorageResult<&InodeRef> {
        self.inode.as_ref().ok_or(StorageError::Closed)
    }
}

impl LogFile for InMemoryLogFile {
    fn size(&self) -> StorageResult<u64> {
        Ok(self.inode()?.read().data.len() as u64)
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        self.inode()?.write().data.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> StorageResult<()> {
        // Nothing is buffered
        self.inode()?;
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.inode.take().map(|_| ()).ok_or(StorageError::Closed)
    }
}
