//! Rotation decision policies.

use crate::error::{RotateError, RotateResult};
use rotolog_storage::LogFile;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A caller-supplied rotation predicate.
///
/// Receives the open live file and the length of the payload about to be
/// written; returns true to rotate first.
#[derive(Clone)]
pub struct RotationPredicate(Arc<dyn Fn(&dyn LogFile, u64) -> bool + Send + Sync>);

impl RotationPredicate {
    /// Wraps a predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn LogFile, u64) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Calls the predicate inside a panic boundary.
    fn call(&self, file: &dyn LogFile, payload_len: u64) -> RotateResult<bool> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.0)(file, payload_len)))
            .map_err(|payload| RotateError::predicate(panic_message(payload.as_ref())))
    }
}

impl fmt::Debug for RotationPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RotationPredicate(..)")
    }
}

/// Decides whether the live file must rotate before a write.
///
/// Pause state is not part of the policy; the engine consults the pause
/// control plane before asking the policy at all.
#[derive(Debug, Clone)]
pub enum RotationPolicy {
    /// Rotate once the tracked size plus the payload reaches the threshold.
    /// A threshold of 0 disables size-based rotation.
    Size(u64),
    /// Delegate to a caller-supplied predicate.
    Custom(RotationPredicate),
}

impl RotationPolicy {
    /// Returns whether to rotate before writing `payload_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `Predicate` if a custom predicate panicked. Callers treat
    /// that as "do not rotate".
    pub fn should_rotate(
        &self,
        file: &dyn LogFile,
        tracked_size: u64,
        payload_len: u64,
    ) -> RotateResult<bool> {
        match self {
            Self::Size(0) => Ok(false),
            Self::Size(threshold) => Ok(tracked_size.saturating_add(payload_len) >= *threshold),
            Self::Custom(predicate) => predicate.call(file, payload_len),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "predicate panicked".to_string()
    }
}
