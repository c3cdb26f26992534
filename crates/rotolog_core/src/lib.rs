//! # rotolog core
//!
//! Size-triggered log file rotation with a pausable rotation decision.
//!
//! This crate provides:
//! - [`RotatingLog`], which appends records to a live file and rotates it
//!   into numbered generations (`app.log.0`, `app.log.1`, ...)
//! - a size threshold policy and pluggable custom rotation predicates
//! - pause leases that suspend rotation while a file is being copied or
//!   archived, without blocking writers
//! - [`LogSink`], a `tracing_subscriber` writer backed by a rotating log
//!
//! ## Example
//!
//! ```rust
//! use rotolog_core::{CancellationToken, RotateConfig, RotatingLog};
//! use rotolog_storage::InMemoryFileSystem;
//! use std::sync::Arc;
//!
//! let fs = InMemoryFileSystem::new();
//! let config = RotateConfig::new("app.log").retain(3).max_size(1024);
//! let log = RotatingLog::with_file_system(config, Arc::new(fs), CancellationToken::new())?;
//!
//! let resume = log.pause();
//! log.dispatch("copied while paused\n")?;
//! resume.resume();
//! # Ok::<(), rotolog_core::RotateError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod handle;
mod pause;
mod planner;
mod predicate;
mod record;
mod scope;
mod sink;

pub use config::{RotateConfig, ALL_LEVELS, DEFAULT_MAX_SIZE, DEFAULT_MODE, DEFAULT_RETAIN};
pub use engine::{Dispatched, RotatingLog};
pub use error::{RotateError, RotateResult};
pub use handle::FileHandle;
pub use pause::{LeaseId, PauseControl, Resume};
pub use planner::{generation_path, PlanStep, RotationPlan};
pub use predicate::{RotationPolicy, RotationPredicate};
pub use record::{FormatError, Record};
pub use sink::{LogSink, SinkWriter};

pub use tokio_util::sync::CancellationToken;
pub use tracing::Level;
