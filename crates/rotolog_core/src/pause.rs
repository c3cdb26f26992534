//! Pause control plane.
//!
//! Rotation can be suspended by any number of independent leases. The set
//! of open leases is owned by a single arbiter thread; everyone else talks
//! to it through a request channel:
//!
//! - `Acquire` registers a fresh lease and replies with its id
//! - `Release` removes exactly one lease
//! - `Query` replies with the number of open leases
//!
//! Requests are served one at a time in arrival order, so a pause is never
//! half-applied and the lease count can never go negative.
//!
//! The arbiter stops as soon as the lifetime signal fires. From then on
//! `pause` hands out no-op [`Resume`] values and queries report "not
//! paused", so nothing ever blocks on a dead arbiter.

use crate::error::{RotateError, RotateResult};
use crate::scope::EngineScope;
use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Identity of one outstanding pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeaseId(u64);

impl LeaseId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lease:{}", self.0)
    }
}

#[derive(Debug)]
enum Request {
    Acquire { reply: SyncSender<LeaseId> },
    Release(LeaseId),
    Query { reply: SyncSender<usize> },
}

/// Handle to the pause arbiter.
///
/// Dropping the handle stops the arbiter and waits for its thread to exit.
#[derive(Debug)]
pub struct PauseControl {
    requests: mpsc::UnboundedSender<Request>,
    shutdown: CancellationToken,
    arbiter: Option<JoinHandle<()>>,
}

impl PauseControl {
    /// Starts the arbiter, bound to `shutdown`.
    ///
    /// # Errors
    ///
    /// Returns `Arbiter` if the runtime or thread cannot be created.
    pub fn spawn(shutdown: &CancellationToken) -> RotateResult<Self> {
        let shutdown = shutdown.child_token();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(RotateError::Arbiter)?;
        let (requests, inbox) = mpsc::unbounded_channel();

        let token = shutdown.clone();
        let arbiter = thread::Builder::new()
            .name("rotolog-pause".to_string())
            .spawn(move || {
                // Arbiter events must never be dispatched back into a log.
                let _scope = EngineScope::enter();
                runtime.block_on(arbitrate(inbox, token));
            })
            .map_err(RotateError::Arbiter)?;

        Ok(Self {
            requests,
            shutdown,
            arbiter: Some(arbiter),
        })
    }

    /// Opens a new lease, suspending rotation until it is resumed.
    ///
    /// Blocks until the arbiter has registered the lease. After shutdown
    /// returns a no-op [`Resume`] immediately.
    pub fn pause(&self) -> Resume {
        if self.shutdown.is_cancelled() {
            return Resume::noop();
        }

        let (reply, response) = sync_channel(1);
        if self.requests.send(Request::Acquire { reply }).is_err() {
            return Resume::noop();
        }

        // The arbiter drops the reply sender if it stops first.
        match response.recv() {
            Ok(lease) => Resume {
                lease: Some((lease, self.requests.clone())),
            },
            Err(_) => Resume::noop(),
        }
    }

    /// Returns true while at least one lease is open.
    ///
    /// Always false after shutdown.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.outstanding() > 0
    }

    /// Returns the number of open leases, or 0 after shutdown.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        if self.shutdown.is_cancelled() {
            return 0;
        }

        let (reply, response) = sync_channel(1);
        if self.requests.send(Request::Query { reply }).is_err() {
            return 0;
        }
        response.recv().unwrap_or(0)
    }
}

impl Drop for PauseControl {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(arbiter) = self.arbiter.take() {
            let _ = arbiter.join();
        }
    }
}

async fn arbitrate(mut inbox: mpsc::UnboundedReceiver<Request>, shutdown: CancellationToken) {
    let mut leases: HashSet<LeaseId> = HashSet::new();
    let mut next_id = 0u64;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!(open_leases = leases.len(), "pause arbiter stopping");
                return;
            }

            request = inbox.recv() => match request {
                Some(Request::Acquire { reply }) => {
                    let lease = LeaseId(next_id);
                    next_id += 1;
                    leases.insert(lease);
                    if reply.send(lease).is_err() {
                        // Nobody will ever resume it.
                        leases.remove(&lease);
                    } else {
                        debug!(%lease, open_leases = leases.len(), "rotation paused");
                    }
                }
                Some(Request::Release(lease)) => {
                    if leases.remove(&lease) {
                        debug!(%lease, open_leases = leases.len(), "lease released");
                    }
                }
                Some(Request::Query { reply }) => {
                    let _ = reply.send(leases.len());
                }
                None => return,
            },
        }
    }
}

/// Capability that releases one pause lease.
///
/// Calling [`Resume::resume`] consumes the value, so a lease can be
/// released at most once. Dropping it without resuming leaves the lease
/// open until the log shuts down.
#[derive(Debug)]
#[must_use = "rotation stays paused until `resume` is called"]
pub struct Resume {
    lease: Option<(LeaseId, mpsc::UnboundedSender<Request>)>,
}

impl Resume {
    fn noop() -> Self {
        Self { lease: None }
    }

    /// Returns true if this value holds no lease (handed out after shutdown).
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.lease.is_none()
    }

    /// Returns the lease this value releases.
    #[must_use]
    pub fn lease(&self) -> Option<LeaseId> {
        self.lease.as_ref().map(|(lease, _)| *lease)
    }

    /// Releases the lease.
    pub fn resume(self) {
        if let Some((lease, requests)) = self.lease {
            let _ = requests.send(Request::Release(lease));
        }
    }
}
