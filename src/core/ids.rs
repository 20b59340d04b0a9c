//! Process-wide monotonic counters: session ids, request ids, and the base
//! port a node starts walking upward from when binding a new session.
//!
//! Grounded on `AbstractSession`'s static `m_nextSid`/`m_basePort` counters
//! (`original_source/src/common/AbstractSession.cpp`): sids are never
//! reused within a run, and port allocation always starts from wherever the
//! last session left off rather than resetting to the node's configured
//! base, so two sessions never fight over the same starting port.

use std::sync::atomic::{AtomicU32, Ordering};

/// Allocates strictly increasing, never-reused session ids for one process.
pub struct SidAllocator {
    next: AtomicU32,
}

impl SidAllocator {
    pub const fn new() -> Self {
        // sid 0 is reserved on the wire to mean "the node itself" (spec.md
        // §3), so real sessions start at 1.
        Self { next: AtomicU32::new(1) }
    }

    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SidAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocates strictly increasing request ids for one client.
///
/// Unlike `SidAllocator` this is meant to be owned per-proxy (rid is
/// "client-local", per spec.md §3), not shared process-wide.
pub struct RidAllocator {
    next: AtomicU32,
}

impl RidAllocator {
    pub const fn new() -> Self {
        Self { next: AtomicU32::new(1) }
    }

    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RidAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, process-wide cursor for the next port a session should try to
/// bind. Each successful bind advances it past the port actually used, so
/// a second session started concurrently doesn't retread the first one's
/// failed attempts.
pub struct PortCursor {
    next: AtomicU32,
}

impl PortCursor {
    pub const fn new(base: u16) -> Self {
        Self { next: AtomicU32::new(base as u32) }
    }

    /// The port to try next.
    pub fn peek(&self) -> u16 {
        self.next.load(Ordering::Relaxed) as u16
    }

    /// Advance the cursor past `bound_port` so the next session starts
    /// above it.
    pub fn advance_past(&self, bound_port: u16) {
        let floor = bound_port as u32 + 1;
        self.next.fetch_max(floor, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sids_are_strictly_increasing_and_never_zero() {
        let alloc = SidAllocator::new();
        let a = alloc.next();
        let b = alloc.next();
        let c = alloc.next();
        assert!(a < b && b < c);
        assert!(a >= 1);
    }

    #[test]
    fn port_cursor_advances_past_bound_port() {
        let cursor = PortCursor::new(6000);
        assert_eq!(cursor.peek(), 6000);
        cursor.advance_past(6003);
        assert_eq!(cursor.peek(), 6004);
        // A lower bind (e.g. a retry that landed earlier) never moves the
        // cursor backwards.
        cursor.advance_past(6001);
        assert_eq!(cursor.peek(), 6004);
    }
}
