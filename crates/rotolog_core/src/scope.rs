//! Per-thread marker for code running inside the engine.
//!
//! Events emitted while the marker is set are discarded by
//! [`crate::LogSink`]. Dispatching them would wait on the rotation lock this
//! thread already holds, or on the pause arbiter from its own thread.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static INSIDE: Cell<bool> = const { Cell::new(false) };
}

/// Sets the marker for the current thread until dropped.
pub(crate) struct EngineScope {
    outer: bool,
    // Must be dropped on the thread that entered.
    _thread: PhantomData<*const ()>,
}

impl EngineScope {
    pub(crate) fn enter() -> Self {
        Self {
            outer: INSIDE.with(|inside| inside.replace(true)),
            _thread: PhantomData,
        }
    }
}

impl Drop for EngineScope {
    fn drop(&mut self) {
        INSIDE.with(|inside| inside.set(self.outer));
    }
}

/// Returns true while the current thread is inside the engine.
pub(crate) fn inside_engine() -> bool {
    INSIDE.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_nest_and_restore() {
        assert!(!inside_engine());
        {
            let _outer = EngineScope::enter();
            assert!(inside_engine());
            {
                let _inner = EngineScope::enter();
                assert!(inside_engine());
            }
            assert!(inside_engine());
        }
        assert!(!inside_engine());
    }

    #[test]
    fn marker_is_per_thread() {
        let _scope = EngineScope::enter();
        let elsewhere = std::thread::spawn(inside_engine).join().unwrap();
        assert!(!elsewhere);
    }
}
