//! Generation shifting.
//!
//! Rotated copies of the live file are numbered by age:
//!
//! ```text
//! app.log      live file
//! app.log.0    most recent rotation
//! app.log.1
//! ...
//! app.log.R-1  oldest kept generation
//! ```
//!
//! A rotation discards `app.log.R-1`, moves every other generation one
//! step older, and finally moves the live file to `app.log.0`. Steps run
//! oldest first so a rename never lands on a file that still has to move.

use crate::error::{RotateError, RotateResult};
use rotolog_storage::FileSystem;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns the path of generation `index` for the live file `path`.
#[must_use]
pub fn generation_path(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// One file-system step of a rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Delete the oldest generation.
    Remove(PathBuf),
    /// Age a generation by one.
    Rename {
        /// Current path.
        from: PathBuf,
        /// Path one generation older.
        to: PathBuf,
    },
}

/// The ordered steps that shift generations for one rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    steps: Vec<PlanStep>,
}

impl RotationPlan {
    /// Builds the plan for live file `path` keeping `retain` generations.
    ///
    /// With `retain == 0` the plan is a single removal of the live file.
    #[must_use]
    pub fn new(path: &Path, retain: usize) -> Self {
        // Index `None` is the live file, `Some(k)` is generation k.
        let source = |index: Option<usize>| match index {
            Some(k) => generation_path(path, k),
            None => path.to_path_buf(),
        };

        let mut steps = Vec::with_capacity(retain + 1);
        let oldest = retain.checked_sub(1);
        steps.push(PlanStep::Remove(source(oldest)));

        let mut index = oldest;
        while let Some(older) = index {
            let younger = older.checked_sub(1);
            steps.push(PlanStep::Rename {
                from: source(younger),
                to: generation_path(path, older),
            });
            index = younger;
        }

        Self { steps }
    }

    /// Returns the planned steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Applies the plan.
    ///
    /// Missing files are skipped, so sparse histories are fine.
    ///
    /// # Errors
    ///
    /// Stops at the first step that fails for any reason other than a
    /// missing file. Steps already applied stay applied.
    pub fn execute(&self, fs: &dyn FileSystem) -> RotateResult<()> {
        for step in &self.steps {
            match step {
                PlanStep::Remove(path) => match fs.remove(path) {
                    Ok(()) => debug!(path = %path.display(), "removed oldest generation"),
                    Err(e) if e.is_not_found() => {}
                    Err(source) => {
                        return Err(RotateError::Remove {
                            path: path.clone(),
                            source,
                        })
                    }
                },
                PlanStep::Rename { from, to } => match fs.rename(from, to) {
                    Ok(()) => debug!(from = %from.display(), to = %to.display(), "shifted generation"),
                    Err(e) if e.is_not_found() => {}
                    Err(source) => {
                        return Err(RotateError::Rename {
                            from: from.clone(),
                            to: to.clone(),
                            source,
                        })
                    }
                },
            }
        }
        Ok(())
    }
}
