//! The rotating log: per-record dispatch and rotation.

use crate::config::RotateConfig;
use crate::error::{RotateError, RotateResult};
use crate::handle::FileHandle;
use crate::pause::{PauseControl, Resume};
use crate::planner::RotationPlan;
use crate::predicate::RotationPolicy;
use crate::record::Record;
use crate::scope::EngineScope;
use parking_lot::Mutex;
use rotolog_storage::{FileSystem, OsFileSystem};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Level};

/// Outcome of a successful [`RotatingLog::dispatch`].
#[derive(Debug)]
pub struct Dispatched {
    /// Bytes appended to the live file.
    pub written: usize,
    /// Whether the file was rotated before the write.
    pub rotated: bool,
    /// A custom predicate failure that was downgraded to "do not rotate".
    pub predicate_fault: Option<RotateError>,
}

/// A log file that rotates itself when it grows too large.
///
/// Records are appended through [`RotatingLog::dispatch`]. Before each write
/// the log checks whether rotation is paused, then asks its
/// [`RotationPolicy`]; on a "rotate" verdict it closes the live file,
/// shifts the numbered generations and reopens a fresh live file.
///
/// # Thread Safety
///
/// `RotatingLog` is `Send + Sync`. The rotation decision, the rotation
/// itself and the write run inside one critical section, so concurrent
/// dispatches never observe a half-rotated file.
///
/// # Lifetime
///
/// The log is bound to a [`CancellationToken`]. Once it fires, every
/// operation fails fast with [`RotateError::ShutDown`] (or, for `pause`,
/// returns a no-op) without touching the file system.
///
/// # Example
///
/// ```rust
/// use rotolog_core::{CancellationToken, RotateConfig, RotatingLog};
/// use rotolog_storage::InMemoryFileSystem;
/// use std::sync::Arc;
///
/// let fs = InMemoryFileSystem::new();
/// let config = RotateConfig::new("app.log").retain(2).max_size(16);
/// let log = RotatingLog::with_file_system(config, Arc::new(fs.clone()), CancellationToken::new())
///     .unwrap();
///
/// log.dispatch("0123456789\n").unwrap();
/// let outcome = log.dispatch("0123456789\n").unwrap();
/// assert!(outcome.rotated);
/// assert!(fs.exists(std::path::Path::new("app.log.0")));
/// ```
#[derive(Debug)]
pub struct RotatingLog {
    levels: Vec<Level>,
    path: PathBuf,
    policy: RotationPolicy,
    plan: RotationPlan,
    live: Mutex<FileHandle>,
    pause: PauseControl,
    shutdown: CancellationToken,
}

impl RotatingLog {
    /// Opens a rotating log on the real file system.
    ///
    /// # Errors
    ///
    /// See [`RotatingLog::with_file_system`].
    pub fn open(config: RotateConfig, shutdown: CancellationToken) -> RotateResult<Self> {
        Self::with_file_system(config, Arc::new(OsFileSystem::new()), shutdown)
    }

    /// Opens a rotating log on the given file system.
    ///
    /// The live file is opened (or created) immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the configuration is invalid (`InvalidConfig`)
    /// - `shutdown` has already fired (`ShutDown`)
    /// - the live file cannot be opened or stat'ed (`Open`)
    /// - the pause arbiter cannot be started (`Arbiter`)
    pub fn with_file_system(
        config: RotateConfig,
        fs: Arc<dyn FileSystem>,
        shutdown: CancellationToken,
    ) -> RotateResult<Self> {
        config.validate()?;
        if shutdown.is_cancelled() {
            return Err(RotateError::ShutDown);
        }

        if config.create_parent_dirs {
            if let Some(dir) = config.parent_dir() {
                fs.create_dir_all(dir).map_err(|source| RotateError::Open {
                    path: config.path.clone(),
                    source,
                })?;
            }
        }

        let live = FileHandle::open(fs, config.path.clone(), config.mode, shutdown.clone())?;
        let pause = PauseControl::spawn(&shutdown)?;

        debug!(
            path = %config.path.display(),
            size = live.size(),
            retain = config.retain,
            "opened rotating log"
        );

        Ok(Self {
            policy: config.policy(),
            plan: RotationPlan::new(&config.path, config.retain),
            levels: config.levels,
            path: config.path,
            live: Mutex::new(live),
            pause,
            shutdown,
        })
    }

    /// Writes one record, rotating first if the policy asks for it.
    ///
    /// The record is rendered before any file access. Rotation is skipped
    /// while any pause lease is open. A panicking custom predicate counts
    /// as "do not rotate"; the failure is reported in
    /// [`Dispatched::predicate_fault`] and the record is still written.
    ///
    /// The payload is handed to the file once; on a short write
    /// [`Dispatched::written`] is less than the payload length.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the log has shut down (`ShutDown`), including while this call
    ///   waited for another dispatch to finish
    /// - the record cannot be rendered (`Format`); nothing is written
    /// - rotation fails (`Close`, `Remove`, `Rename`, `Open`); the record
    ///   is not written and generations may be partially shifted
    /// - the write fails (`Write`); the tracked size is not advanced
    pub fn dispatch<R: Record + ?Sized>(&self, record: &R) -> RotateResult<Dispatched> {
        self.dispatch_with(record, false)
    }

    /// Like [`RotatingLog::dispatch`], but keeps writing until the whole
    /// payload is in the live file.
    ///
    /// All writes happen in the same critical section as the rotation
    /// decision, so the record never straddles two generations.
    ///
    /// # Errors
    ///
    /// Same as [`RotatingLog::dispatch`]. A write that makes no progress is
    /// a `Write` error; bytes written before it stay in the file.
    pub fn dispatch_all<R: Record + ?Sized>(&self, record: &R) -> RotateResult<Dispatched> {
        self.dispatch_with(record, true)
    }

    fn dispatch_with<R: Record + ?Sized>(
        &self,
        record: &R,
        whole: bool,
    ) -> RotateResult<Dispatched> {
        self.ensure_running()?;
        let payload = record.to_bytes()?;

        let (outcome, rotated_size) = {
            let _scope = EngineScope::enter();
            let mut live = self.live.lock();
            // The signal may have fired while we waited for the lock.
            self.ensure_running()?;

            let mut predicate_fault = None;
            let rotate = if self.pause.is_paused() {
                false
            } else {
                match self
                    .policy
                    .should_rotate(live.file(), live.size(), payload.len() as u64)
                {
                    Ok(rotate) => rotate,
                    Err(e) => {
                        predicate_fault = Some(e);
                        false
                    }
                }
            };

            let rotated_size = if rotate {
                Some(self.rotate(&mut live)?)
            } else {
                None
            };

            // A slow predicate can outlive the signal.
            self.ensure_running()?;
            let written = if whole {
                live.write_all(&payload)?
            } else {
                live.write(&payload)?
            };

            let outcome = Dispatched {
                written,
                rotated: rotate,
                predicate_fault,
            };
            (outcome, rotated_size)
        };

        // Logged outside the lock so a `LogSink` on this log can take them.
        if let Some(fault) = &outcome.predicate_fault {
            warn!(path = %self.path.display(), error = %fault, "not rotating");
        }
        if let Some(rotated_size) = rotated_size {
            info!(path = %self.path.display(), rotated_size, "rotated log file");
        }
        Ok(outcome)
    }

    /// Close, shift, reopen. Caller holds the `live` lock.
    ///
    /// Returns the size of the file that was rotated away.
    fn rotate(&self, live: &mut FileHandle) -> RotateResult<u64> {
        self.ensure_running()?;
        let rotated_size = live.size();

        live.close()?;

        if let Err(e) = self.plan.execute(live.file_system()) {
            // Keep the log writable; the failed shift is not retried.
            if let Err(reopen) = live.reopen() {
                warn!(path = %self.path.display(), error = %reopen, "could not reopen after failed rotation");
            }
            return Err(e);
        }

        live.reopen()?;
        if live.size() != 0 {
            warn!(
                path = %self.path.display(),
                size = live.size(),
                "live file not empty after rotation"
            );
        }
        live.set_size(0);
        Ok(rotated_size)
    }

    /// Suspends rotation until the returned [`Resume`] is resumed.
    ///
    /// Leases nest: rotation stays suspended while any lease is open. When
    /// this returns, no rotation is in progress and none will start until
    /// the lease is released, so the live file can be copied safely.
    ///
    /// After shutdown returns a no-op [`Resume`].
    ///
    /// Must not be called from inside a custom rotation predicate; the
    /// predicate runs inside the rotation critical section this waits on.
    pub fn pause(&self) -> Resume {
        let resume = self.pause.pause();
        if !resume.is_noop() {
            // Wait out a rotation that started before the lease existed.
            drop(self.live.lock());
        }
        resume
    }

    /// Returns true while at least one pause lease is open.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Returns the number of open pause leases.
    #[must_use]
    pub fn outstanding_leases(&self) -> usize {
        self.pause.outstanding()
    }

    /// Returns the severities this log wants to receive.
    #[must_use]
    pub fn interested_severities(&self) -> &[Level] {
        &self.levels
    }

    /// Returns the tracked size of the live file.
    ///
    /// Starts from the on-disk length at open and drops to zero on rotation.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.live.lock().size()
    }

    /// Returns the live file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the live file.
    ///
    /// # Errors
    ///
    /// Returns `ShutDown` after shutdown, or `Flush` if the flush fails.
    pub fn flush(&self) -> RotateResult<()> {
        self.ensure_running()?;
        let mut live = self.live.lock();
        self.ensure_running()?;
        live.flush()
    }

    /// Returns true once the lifetime signal has fired.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn ensure_running(&self) -> RotateResult<()> {
        if self.shutdown.is_cancelled() {
            Err(RotateError::ShutDown)
        } else {
            Ok(())
        }
    }
}
