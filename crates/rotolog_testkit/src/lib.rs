//! # rotolog testkit
//!
//! Test utilities for rotolog.
//!
//! This crate provides:
//! - [`FaultyFileSystem`], a fault-injecting file system wrapper
//! - Temporary log directories and generation inspection
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rotolog_testkit::prelude::*;
//!
//! #[test]
//! fn rotates_on_disk() {
//!     let log = TestLog::new("app.log");
//!     // ... open a RotatingLog at log.path(), write records
//!     assert!(is_contiguous(&log.generations()));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faulty::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faulty::*;
pub use fixtures::*;
pub use generators::*;
