//! Outstanding-work counter used to implement drain-to-empty.
//!
//! Producers call [`DrainGate::begin`] before handing work to a consumer and
//! the consumer calls [`DrainGate::complete`] once the work is fully handled.
//! [`DrainGate::wait_idle`] blocks until every begun item has completed, which
//! is stronger than observing an empty queue: an item that was dequeued but is
//! still being handled keeps the gate closed.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Counter of accepted-but-unfinished work items with a blocking idle wait.
#[derive(Debug, Default)]
pub struct DrainGate {
    outstanding: Mutex<u64>,
    idle: Condvar,
}

impl DrainGate {
    /// Create a gate with no outstanding work.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outstanding: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    /// Record one more outstanding item.
    pub fn begin(&self) {
        let mut outstanding = self.lock();
        *outstanding = outstanding.saturating_add(1);
    }

    /// Record that one outstanding item finished (or was never handed off).
    pub fn complete(&self) {
        let mut outstanding = self.lock();
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.idle.notify_all();
        }
    }

    /// Current number of outstanding items.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        *self.lock()
    }

    /// Block until the outstanding count reaches zero.
    pub fn wait_idle(&self) {
        let mut outstanding = self.lock();
        while *outstanding > 0 {
            outstanding = self
                .idle
                .wait(outstanding)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
