//! `tracing` integration.
//!
//! [`LogSink`] plugs a [`RotatingLog`] into `tracing_subscriber::fmt` as its
//! writer. Every formatted event becomes one record; events whose level is
//! not among [`RotatingLog::interested_severities`] are dropped.
//!
//! Events the engine emits while it holds the rotation lock, and events from
//! the pause arbiter thread, are dropped by the sink. They still reach every
//! other layer of the subscriber.
//!
//! ```rust,no_run
//! use rotolog_core::{CancellationToken, LogSink, RotateConfig, RotatingLog};
//! use std::sync::Arc;
//!
//! let log = RotatingLog::open(RotateConfig::new("app.log"), CancellationToken::new()).unwrap();
//! tracing_subscriber::fmt()
//!     .with_ansi(false)
//!     .with_writer(LogSink::new(Arc::new(log)))
//!     .init();
//!
//! tracing::info!("written to app.log");
//! ```

use crate::engine::RotatingLog;
use crate::scope::inside_engine;
use std::io;
use std::sync::Arc;
use tracing::Metadata;
use tracing_subscriber::fmt::MakeWriter;

/// A `MakeWriter` that dispatches formatted events to a [`RotatingLog`].
#[derive(Debug, Clone)]
pub struct LogSink {
    log: Arc<RotatingLog>,
}

impl LogSink {
    /// Creates a sink writing to `log`.
    #[must_use]
    pub fn new(log: Arc<RotatingLog>) -> Self {
        Self { log }
    }

    /// Returns the underlying log.
    #[must_use]
    pub fn log(&self) -> &Arc<RotatingLog> {
        &self.log
    }
}

impl From<Arc<RotatingLog>> for LogSink {
    fn from(log: Arc<RotatingLog>) -> Self {
        Self::new(log)
    }
}

/// Writer for one event. Discards everything when the level is filtered out.
///
/// Each `write` call becomes one [`RotatingLog::dispatch_all`], so a
/// formatted event is never split across generations.
#[derive(Debug)]
pub struct SinkWriter<'a> {
    log: Option<&'a RotatingLog>,
}

impl io::Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(log) = self.log else {
            return Ok(buf.len());
        };
        let outcome = log
            .dispatch_all(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(outcome.written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.log {
            Some(log) => log
                .flush()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e)),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            log: (!inside_engine()).then_some(self.log.as_ref()),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        let wanted =
            !inside_engine() && self.log.interested_severities().contains(meta.level());
        SinkWriter {
            log: wanted.then_some(self.log.as_ref()),
        }
    }
}
