//! Monotonic logical clock used to stamp pool slots with recency.
//!
//! The brick pool's LRU-like paging policy (spec.md §4.8.3) needs only a
//! total order over "when was this slot last written", not wall-clock
//! time — a plain incrementing counter (`tCreated` in the spec) is both
//! simpler and immune to clock adjustments. Grounded on the counter-style
//! bookkeeping in `core/time.rs`'s `FrameTimer`, stripped down to the one
//! operation the pool actually needs.
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing "time of creation" stamps.
#[derive(Debug, Default)]
pub struct LogicalClock {
    next: AtomicU64,
}

impl LogicalClock {
    pub const fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    /// Advance the clock and return the new stamp.
    pub fn tick(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Current stamp without advancing.
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_strictly_increasing() {
        let clock = LogicalClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(b > a);
    }
}
