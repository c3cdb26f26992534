//! Rotating log configuration.

use crate::error::{RotateError, RotateResult};
use crate::predicate::{RotationPolicy, RotationPredicate};
use rotolog_storage::LogFile;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Default number of rotated generations kept on disk.
pub const DEFAULT_RETAIN: usize = 5;

/// Default size threshold: 10 MiB.
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Default permission bits for newly created log files.
pub const DEFAULT_MODE: u32 = 0o600;

/// Every severity, most verbose first.
pub const ALL_LEVELS: [Level; 5] = [
    Level::TRACE,
    Level::DEBUG,
    Level::INFO,
    Level::WARN,
    Level::ERROR,
];

/// Configuration for a [`crate::RotatingLog`].
///
/// Immutable once the log has been opened.
#[derive(Clone)]
pub struct RotateConfig {
    /// Severities the log wants to receive.
    pub levels: Vec<Level>,

    /// Path of the live log file.
    pub path: PathBuf,

    /// Number of rotated generations to keep (0 = delete instead of rotating).
    pub retain: usize,

    /// Rotate once the file would reach this many bytes (0 = never by size).
    pub max_size: u64,

    /// Permission bits for newly created files.
    pub mode: u32,

    /// Whether to create missing parent directories of `path`.
    pub create_parent_dirs: bool,

    /// Custom rotation predicate; overrides `max_size` when set.
    pub predicate: Option<RotationPredicate>,
}

impl RotateConfig {
    /// Creates a configuration for `path` with default values.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            levels: ALL_LEVELS.to_vec(),
            path: path.into(),
            retain: DEFAULT_RETAIN,
            max_size: DEFAULT_MAX_SIZE,
            mode: DEFAULT_MODE,
            create_parent_dirs: false,
            predicate: None,
        }
    }

    /// Sets the severities of interest.
    #[must_use]
    pub fn levels(mut self, levels: impl Into<Vec<Level>>) -> Self {
        self.levels = levels.into();
        self
    }

    /// Sets how many rotated generations to keep.
    #[must_use]
    pub const fn retain(mut self, count: usize) -> Self {
        self.retain = count;
        self
    }

    /// Sets the size threshold in bytes.
    #[must_use]
    pub const fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Sets the permission bits for new files.
    #[must_use]
    pub const fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Sets whether missing parent directories are created on open.
    #[must_use]
    pub const fn create_parent_dirs(mut self, value: bool) -> Self {
        self.create_parent_dirs = value;
        self
    }

    /// Installs a custom rotation predicate.
    ///
    /// The predicate receives the open file and the length of the record
    /// about to be written. It replaces the size threshold entirely.
    #[must_use]
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&dyn LogFile, u64) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(RotationPredicate::new(predicate));
        self
    }

    /// Returns the policy this configuration selects.
    #[must_use]
    pub fn policy(&self) -> RotationPolicy {
        match &self.predicate {
            Some(predicate) => RotationPolicy::Custom(predicate.clone()),
            None => RotationPolicy::Size(self.max_size),
        }
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the path is empty or has no file name.
    pub fn validate(&self) -> RotateResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(RotateError::invalid_config("log file path is empty"));
        }
        if self.path.file_name().is_none() {
            return Err(RotateError::invalid_config(format!(
                "log file path has no file name: {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Returns the parent directory of the live file, if it has one.
    pub(crate) fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl std::fmt::Debug for RotateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotateConfig")
            .field("levels", &self.levels)
            .field("path", &self.path)
            .field("retain", &self.retain)
            .field("max_size", &self.max_size)
            .field("mode", &format_args!("{:o}", self.mode))
            .field("create_parent_dirs", &self.create_parent_dirs)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RotateConfig::new("app.log");
        assert_eq!(config.levels, ALL_LEVELS.to_vec());
        assert_eq!(config.retain, DEFAULT_RETAIN);
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.mode, 0o600);
        assert!(!config.create_parent_dirs);
        assert!(config.predicate.is_none());
    }

    #[test]
    fn builder_pattern() {
        let config = RotateConfig::new("logs/app.log")
            .levels([Level::WARN, Level::ERROR])
            .retain(0)
            .max_size(16_000)
            .mode(0o644)
            .create_parent_dirs(true);

        assert_eq!(config.levels, vec![Level::WARN, Level::ERROR]);
        assert_eq!(config.retain, 0);
        assert_eq!(config.max_size, 16_000);
        assert_eq!(config.mode, 0o644);
        assert!(config.create_parent_dirs);
        assert_eq!(config.parent_dir(), Some(Path::new("logs")));
    }

    #[test]
    fn predicate_overrides_size() {
        let sized = RotateConfig::new("app.log").max_size(10);
        assert!(matches!(sized.policy(), RotationPolicy::Size(10)));

        let custom = sized.predicate(|_, _| true);
        assert!(matches!(custom.policy(), RotationPolicy::Custom(_)));
    }

    #[test]
    fn validate_rejects_bad_paths() {
        assert!(RotateConfig::new("").validate().is_err());
        assert!(RotateConfig::new("/").validate().is_err());
        assert!(RotateConfig::new("logs/..").validate().is_err());
        assert!(RotateConfig::new("app.log").validate().is_ok());
    }

    #[test]
    fn bare_file_name_has_no_parent() {
        assert_eq!(RotateConfig::new("app.log").parent_dir(), None);
    }

    #[test]
    fn debug_hides_predicate_body() {
        let config = RotateConfig::new("app.log").predicate(|_, _| false);
        let rendered = format!("{config:?}");
        assert!(rendered.contains("predicate: true"));
        assert!(rendered.contains("mode: 600"));
    }
}
