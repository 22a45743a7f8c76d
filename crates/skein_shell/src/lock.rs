//! Per-instance execution lock.
//!
//! An instance never leaves the thread that built it: its runtime is reference counted and
//! not `Send`, so nothing here is shared across threads. Holding the lock means script code of
//! this instance is running. `unlocked` marks a blocking host read, during which none runs.

use std::cell::Cell;

use tracing::trace;

#[derive(Default)]
pub struct ExecLock {
    /// Nesting depth of `acquire`; zero inside `unlocked`.
    depth: Cell<usize>,
}

/// Releases one level of the lock when dropped.
pub struct ExecGuard<'a> {
    lock: &'a ExecLock,
}

impl ExecLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ExecGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        ExecGuard { lock: self }
    }

    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    /// Runs `f` with the lock released, restoring the previous depth afterwards.
    pub fn unlocked<R>(&self, f: impl FnOnce() -> R) -> R {
        let depth = self.depth.replace(0);
        if depth > 0 {
            trace!(depth, "execution lock released for blocking read");
        }
        let result = f();
        self.depth.set(depth);
        result
    }
}

impl Drop for ExecGuard<'_> {
    fn drop(&mut self) {
        self.lock.depth.set(self.lock.depth.get().saturating_sub(1));
    }
}
