//! Test fixtures for real-disk rotation tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A log path inside a temporary directory, removed on drop.
#[derive(Debug)]
pub struct TestLog {
    dir: TempDir,
    path: PathBuf,
}

impl TestLog {
    /// Creates a fresh temporary directory holding no files.
    ///
    /// The live log path is `<dir>/<name>`.
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join(name);
        Self { dir, path }
    }

    /// Returns the live log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temporary directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the names of the live file and every generation, sorted.
    pub fn files(&self) -> Vec<String> {
        let prefix = self.file_name();
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .expect("Failed to read temp directory")
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix))
            .collect();
        names.sort();
        names
    }

    /// Returns the generation indices present on disk, ascending.
    pub fn generations(&self) -> Vec<usize> {
        let prefix = format!("{}.", self.file_name());
        let mut indices: Vec<usize> = self
            .files()
            .iter()
            .filter_map(|name| name.strip_prefix(&prefix))
            .filter_map(|suffix| suffix.parse().ok())
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Returns the on-disk length of the live file, or 0 if it is missing.
    pub fn live_len(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Returns the on-disk length of generation `index`.
    pub fn generation_len(&self, index: usize) -> Option<u64> {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        fs::metadata(PathBuf::from(name)).map(|m| m.len()).ok()
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("Log name must be valid UTF-8")
            .to_string()
    }
}

/// Builds a newline-terminated record of exactly `len` bytes.
///
/// The record starts with `seq` so consecutive records differ.
pub fn record_of_len(seq: usize, len: usize) -> String {
    assert!(len > 0, "Record must hold at least the newline");
    let mut record = format!("{seq:08} ");
    record.truncate(len - 1);
    while record.len() < len - 1 {
        record.push('x');
    }
    record.push('\n');
    record
}

/// Returns true if `indices` is exactly `0..indices.len()`.
pub fn is_contiguous(indices: &[usize]) -> bool {
    indices.iter().enumerate().all(|(i, &k)| i == k)
}
