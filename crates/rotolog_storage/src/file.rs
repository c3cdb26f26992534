//! Operating-system file system.

use crate::backend::{FileSystem, LogFile};
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The real file system, backed by `std::fs`.
///
/// # Permissions
///
/// On Unix the `mode` passed to [`FileSystem::open_append`] is applied when
/// the file is created (subject to the process umask). Other platforms
/// ignore it.
///
/// # Example
///
/// ```no_run
/// use rotolog_storage::{FileSystem, LogFile, OsFileSystem};
/// use std::path::Path;
///
/// let fs = OsFileSystem::new();
/// let mut file = fs.open_append(Path::new("app.log"), 0o600).unwrap();
/// file.write(b"hello\n").unwrap();
/// file.close().unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// Creates a handle to the OS file system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn open_append(&self, path: &Path, mode: u32) -> StorageResult<Box<dyn LogFile>> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        let file = options
            .open(path)
            .map_err(|e| StorageError::from_io(e, path))?;

        Ok(Box::new(OsLogFile {
            path: path.to_path_buf(),
            file: Some(file),
        }))
    }

    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        fs::rename(from, to).map_err(|e| StorageError::from_io(e, from))
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        fs::remove_file(path).map_err(|e| StorageError::from_io(e, path))
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

/// An append-only handle on a real file.
#[derive(Debug)]
pub struct OsLogFile {
    path: PathBuf,
    file: Option<File>,
}

impl OsLogFile {
    /// Returns the path the handle was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&self) -> StorageResult<&File> {
        self.file.as_ref().ok_or(StorageError::Closed)
    }

    fn file_mut(&mut self) -> StorageResult<&mut File> {
        self.file.as_mut().ok_or(StorageError::Closed)
    }
}

impl LogFile for OsLogFile {
    fn size(&self) -> StorageResult<u64> {
        Ok(self.file()?.metadata()?.len())
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        let file = self.file_mut()?;
        Ok(file.write(data)?)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.file_mut()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        let mut file = self.file.take().ok_or(StorageError::Closed)?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let file = OsFileSystem::new().open_append(&path, 0o600).unwrap();
        assert_eq!(file.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn open_existing_reports_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"already here\n").unwrap();

        let file = OsFileSystem::new().open_append(&path, 0o600).unwrap();
        assert_eq!(file.size().unwrap(), 13);
    }

    #[test]
    fn write_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"one\n").unwrap();

        let mut file = OsFileSystem::new().open_append(&path, 0o600).unwrap();
        assert_eq!(file.write(b"two\n").unwrap(), 4);
        file.close().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"one\ntwo\n");
    }

    #[test]
    fn close_twice_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut file = OsFileSystem::new().open_append(&path, 0o600).unwrap();
        file.close().unwrap();

        assert!(matches!(file.close(), Err(StorageError::Closed)));
        assert!(matches!(file.write(b"x"), Err(StorageError::Closed)));
        assert!(matches!(file.size(), Err(StorageError::Closed)));
    }

    #[test]
    fn rename_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("missing.log");
        let to = dir.path().join("missing.log.0");

        let err = OsFileSystem::new().rename(&from, &to).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let err = OsFileSystem::new()
            .remove(&dir.path().join("missing.log"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn rename_replaces_target() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("app.log");
        let to = dir.path().join("app.log.0");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        OsFileSystem::new().rename(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }

    #[test]
    fn create_dir_all_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        OsFileSystem::new().create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn mode_applied_on_create() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        OsFileSystem::new().open_append(&path, 0o600).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
