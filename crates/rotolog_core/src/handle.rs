//! The live file and its tracked size.

use crate::error::{RotateError, RotateResult};
use rotolog_storage::{FileSystem, LogFile, StorageError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Owns the open live log file and the byte count written to it.
///
/// The tracked size starts from the on-disk length on every `open`, so a
/// restart on an existing file behaves like a process that never stopped.
#[derive(Debug)]
pub struct FileHandle {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    mode: u32,
    file: Box<dyn LogFile>,
    size: u64,
    shutdown: CancellationToken,
}

impl FileHandle {
    /// Opens or creates the live file.
    ///
    /// # Errors
    ///
    /// Returns `ShutDown` if `shutdown` has fired, or `Open` if the file
    /// cannot be opened or stat'ed.
    pub fn open(
        fs: Arc<dyn FileSystem>,
        path: PathBuf,
        mode: u32,
        shutdown: CancellationToken,
    ) -> RotateResult<Self> {
        let (file, size) = open_live(fs.as_ref(), &path, mode, &shutdown)?;
        Ok(Self {
            fs,
            path,
            mode,
            file,
            size,
            shutdown,
        })
    }

    /// Reopens the live file after a rotation.
    ///
    /// The tracked size is replaced by the fresh on-disk length.
    ///
    /// # Errors
    ///
    /// Same as [`FileHandle::open`]. On error the handle stays closed.
    pub fn reopen(&mut self) -> RotateResult<()> {
        let (file, size) = open_live(self.fs.as_ref(), &self.path, self.mode, &self.shutdown)?;
        self.file = file;
        self.size = size;
        Ok(())
    }

    /// Appends `data`, advancing the tracked size by the bytes written.
    ///
    /// # Errors
    ///
    /// Returns `Write` if the write fails; the tracked size is unchanged.
    pub fn write(&mut self, data: &[u8]) -> RotateResult<usize> {
        let written = self.file.write(data).map_err(|source| RotateError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.size += written as u64;
        Ok(written)
    }

    /// Appends all of `data`, retrying after short writes.
    ///
    /// # Errors
    ///
    /// Returns `Write` if a write fails or makes no progress. Bytes already
    /// written stay counted in the tracked size.
    pub fn write_all(&mut self, data: &[u8]) -> RotateResult<usize> {
        let mut rest = data;
        while !rest.is_empty() {
            let written = self.write(rest)?;
            if written == 0 {
                return Err(RotateError::Write {
                    path: self.path.clone(),
                    source: StorageError::Io(io::ErrorKind::WriteZero.into()),
                });
            }
            rest = &rest[written..];
        }
        Ok(data.len())
    }

    /// Flushes buffered data.
    ///
    /// # Errors
    ///
    /// Returns `Flush` if the flush fails.
    pub fn flush(&mut self) -> RotateResult<()> {
        self.file.flush().map_err(|source| RotateError::Flush {
            path: self.path.clone(),
            source,
        })
    }

    /// Flushes and releases the live file.
    ///
    /// # Errors
    ///
    /// Returns `Close` if the handle was already closed or the final flush
    /// fails.
    pub fn close(&mut self) -> RotateResult<()> {
        self.file.close().map_err(|source| RotateError::Close {
            path: self.path.clone(),
            source,
        })
    }

    /// Returns the bytes written since the last rotation.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Overrides the tracked size.
    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    /// Returns the open file.
    #[must_use]
    pub fn file(&self) -> &dyn LogFile {
        self.file.as_ref()
    }

    /// Returns the live file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file system the handle opens files on.
    #[must_use]
    pub fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

fn open_live(
    fs: &dyn FileSystem,
    path: &Path,
    mode: u32,
    shutdown: &CancellationToken,
) -> RotateResult<(Box<dyn LogFile>, u64)> {
    if shutdown.is_cancelled() {
        return Err(RotateError::ShutDown);
    }

    let open_err = |source: StorageError| RotateError::Open {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs.open_append(path, mode).map_err(open_err)?;
    let size = match file.size() {
        Ok(size) => size,
        Err(e) => {
            let _ = file.close();
            return Err(open_err(e));
        }
    };
    Ok((file, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotolog_storage::InMemoryFileSystem;

    fn open(fs: &InMemoryFileSystem) -> FileHandle {
        FileHandle::open(
            Arc::new(fs.clone()),
            PathBuf::from("app.log"),
            0o600,
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn open_tracks_existing_length() {
        let fs = InMemoryFileSystem::new();
        fs.write_file("app.log", vec![b'x'; 42]);

        let handle = open(&fs);
        assert_eq!(handle.size(), 42);
    }

    #[test]
    fn open_creates_missing_file() {
        let fs = InMemoryFileSystem::new();

        let handle = open(&fs);
        assert_eq!(handle.size(), 0);
        assert_eq!(fs.mode(Path::new("app.log")), Some(0o600));
    }

    #[test]
    fn writes_accumulate() {
        let fs = InMemoryFileSystem::new();
        let mut handle = open(&fs);

        assert_eq!(handle.write(b"hello ").unwrap(), 6);
        assert_eq!(handle.write(b"world\n").unwrap(), 6);

        assert_eq!(handle.size(), 12);
        assert_eq!(handle.file().size().unwrap(), 12);
    }

    #[test]
    fn close_twice_is_an_error() {
        let fs = InMemoryFileSystem::new();
        let mut handle = open(&fs);

        handle.close().unwrap();
        assert!(matches!(handle.close(), Err(RotateError::Close { .. })));
        assert!(matches!(handle.write(b"x"), Err(RotateError::Write { .. })));
        assert_eq!(handle.size(), 0);
    }

    #[test]
    fn reopen_replaces_size() {
        let fs = InMemoryFileSystem::new();
        let mut handle = open(&fs);
        handle.write(b"0123456789").unwrap();
        handle.close().unwrap();

        fs.remove(Path::new("app.log")).unwrap();
        handle.reopen().unwrap();

        assert_eq!(handle.size(), 0);
        handle.write(b"ab").unwrap();
        assert_eq!(fs.contents(Path::new("app.log")).unwrap(), b"ab");
    }

    #[test]
    fn open_after_shutdown_fails() {
        let token = CancellationToken::new();
        token.cancel();

        let err = FileHandle::open(
            Arc::new(InMemoryFileSystem::new()),
            PathBuf::from("app.log"),
            0o600,
            token,
        )
        .unwrap_err();
        assert!(err.is_shut_down());
    }
}
