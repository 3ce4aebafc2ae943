//! Async dispatch options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What `log` does when the pending-event queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for the consumer to make room.
    #[default]
    Block,
    /// Fail immediately with a retriable error.
    Reject,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Block => "block",
            Self::Reject => "reject",
        })
    }
}

/// Queue settings used when switching to asynchronous dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsyncOptions {
    /// Maximum number of pending events.
    pub capacity: usize,
    /// Behavior when the queue is full.
    pub on_full: OverflowPolicy,
}

impl AsyncOptions {
    /// Queue capacity used when none is given.
    pub const DEFAULT_CAPACITY: usize = 100;
    /// Largest accepted queue capacity.
    pub const MAX_CAPACITY: usize = 1_000_000;

    /// Blocking queue of `capacity` events.
    #[must_use]
    pub const fn blocking(capacity: usize) -> Self {
        Self {
            capacity,
            on_full: OverflowPolicy::Block,
        }
    }

    /// Rejecting queue of `capacity` events.
    #[must_use]
    pub const fn rejecting(capacity: usize) -> Self {
        Self {
            capacity,
            on_full: OverflowPolicy::Reject,
        }
    }

    /// Returns true when the capacity is within `1..=MAX_CAPACITY`.
    #[must_use]
    pub const fn has_valid_capacity(&self) -> bool {
        self.capacity >= 1 && self.capacity <= Self::MAX_CAPACITY
    }
}

impl Default for AsyncOptions {
    fn default() -> Self {
        Self::blocking(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_block_with_hundred_slots() {
        let options = AsyncOptions::default();
        assert_eq!(options.capacity, 100);
        assert_eq!(options.on_full, OverflowPolicy::Block);
        assert!(options.has_valid_capacity());
    }

    #[test]
    fn capacity_bounds_are_checked() {
        assert!(!AsyncOptions::blocking(0).has_valid_capacity());
        assert!(AsyncOptions::rejecting(1).has_valid_capacity());
        assert!(!AsyncOptions::blocking(AsyncOptions::MAX_CAPACITY + 1).has_valid_capacity());
    }
}
