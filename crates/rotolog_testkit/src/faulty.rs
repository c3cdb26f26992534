//! Fault injection for the file-system capability.
//!
//! [`FaultyFileSystem`] wraps another [`FileSystem`] and fails selected
//! operations on demand. It also counts every operation that reaches the
//! inner file system, which lets tests assert that nothing touched the disk.

use parking_lot::Mutex;
use rotolog_storage::{FileSystem, LogFile, StorageError, StorageResult};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Faults {
    fail_open: AtomicBool,
    fail_write: AtomicBool,
    fail_close: AtomicBool,
    short_write: AtomicUsize,
    fail_rename_from: Mutex<Option<PathBuf>>,
    fail_remove: AtomicBool,
    operations: AtomicUsize,
}

impl Faults {
    fn count(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

fn injected(what: &str) -> StorageError {
    StorageError::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("injected {what} failure"),
    ))
}

/// A file system wrapper that fails operations on demand.
#[derive(Debug, Clone)]
pub struct FaultyFileSystem {
    inner: Arc<dyn FileSystem>,
    faults: Arc<Faults>,
}

impl FaultyFileSystem {
    /// Wraps `inner`. No faults are armed initially.
    pub fn new(inner: Arc<dyn FileSystem>) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults::default()),
        }
    }

    /// Makes every `open_append` fail.
    pub fn set_fail_open(&self, fail: bool) {
        self.faults.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Makes every write on files opened through this wrapper fail.
    pub fn set_fail_write(&self, fail: bool) {
        self.faults.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Makes every close fail (without releasing the inner handle).
    pub fn set_fail_close(&self, fail: bool) {
        self.faults.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Caps every write at `max` bytes (0 disables the cap).
    pub fn set_short_writes(&self, max: usize) {
        self.faults.short_write.store(max, Ordering::SeqCst);
    }

    /// Makes renames whose source is `path` fail.
    pub fn fail_rename_from(&self, path: impl Into<PathBuf>) {
        *self.faults.fail_rename_from.lock() = Some(path.into());
    }

    /// Makes every removal of an existing or missing file fail.
    pub fn set_fail_remove(&self, fail: bool) {
        self.faults.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Returns how many operations reached the inner file system.
    #[must_use]
    pub fn operations(&self) -> usize {
        self.faults.operations.load(Ordering::SeqCst)
    }

    /// Disarms every fault. The operation counter is kept.
    pub fn reset(&self) {
        let faults = &self.faults;
        faults.fail_open.store(false, Ordering::SeqCst);
        faults.fail_write.store(false, Ordering::SeqCst);
        faults.fail_close.store(false, Ordering::SeqCst);
        faults.short_write.store(0, Ordering::SeqCst);
        faults.fail_remove.store(false, Ordering::SeqCst);
        *faults.fail_rename_from.lock() = None;
    }
}

impl FileSystem for FaultyFileSystem {
    fn open_append(&self, path: &Path, mode: u32) -> StorageResult<Box<dyn LogFile>> {
        if self.faults.fail_open.load(Ordering::SeqCst) {
            return Err(injected("open"));
        }
        self.faults.count();
        let inner = self.inner.open_append(path, mode)?;
        Ok(Box::new(FaultyLogFile {
            inner,
            faults: Arc::clone(&self.faults),
        }))
    }

    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        if self.faults.fail_rename_from.lock().as_deref() == Some(from) {
            return Err(injected("rename"));
        }
        self.faults.count();
        self.inner.rename(from, to)
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        if self.faults.fail_remove.load(Ordering::SeqCst) {
            return Err(injected("remove"));
        }
        self.faults.count();
        self.inner.remove(path)
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        self.faults.count();
        self.inner.create_dir_all(path)
    }
}

#[derive(Debug)]
struct FaultyLogFile {
    inner: Box<dyn LogFile>,
    faults: Arc<Faults>,
}

impl LogFile for FaultyLogFile {
    fn size(&self) -> StorageResult<u64> {
        self.faults.count();
        self.inner.size()
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        if self.faults.fail_write.load(Ordering::SeqCst) {
            return Err(injected("write"));
        }
        self.faults.count();
        let cap = self.faults.short_write.load(Ordering::SeqCst);
        let data = if cap > 0 && data.len() > cap {
            &data[..cap]
        } else {
            data
        };
        self.inner.write(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.faults.count();
        self.inner.flush()
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.faults.fail_close.load(Ordering::SeqCst) {
            return Err(injected("close"));
        }
        self.faults.count();
        self.inner.close()
    }
}
