//! ## minnesvakt-core::stats
//! **Allocation statistics and tracking**
//!
//! This module provides per-allocator counters for tracking and reporting
//! allocation activity, used mainly for teardown diagnostics.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-allocator statistics tracker.
///
/// This struct uses atomic operations for thread-safe statistics tracking.
pub struct AllocationStats {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
}

impl AllocationStats {
    /// Creates a new `AllocationStats` instance with all counters at zero.
    pub fn new() -> Self {
        AllocationStats {
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
        }
    }

    /// Records one successful allocation.
    #[inline]
    pub fn record_allocation(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one deallocation.
    #[inline]
    pub fn record_deallocation(&self) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total count of allocations.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Returns the total count of deallocations.
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    /// Returns the number of blocks currently outstanding. The counters are
    /// relaxed, so a reader racing with other threads may observe a stale
    /// value; quiescent reads (e.g. at teardown) are exact.
    pub fn outstanding(&self) -> usize {
        self.allocations().saturating_sub(self.deallocations())
    }
}

impl Default for AllocationStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record_and_read() {
        let stats = AllocationStats::new();
        assert_eq!(stats.allocations(), 0);
        assert_eq!(stats.outstanding(), 0);

        stats.record_allocation();
        assert_eq!(stats.allocations(), 1);
        assert_eq!(stats.outstanding(), 1);

        stats.record_deallocation();
        assert_eq!(stats.deallocations(), 1);
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn test_stats_multiple_increments() {
        let stats = AllocationStats::new();
        for _ in 0..100 {
            stats.record_allocation();
        }
        for _ in 0..40 {
            stats.record_deallocation();
        }

        assert_eq!(stats.allocations(), 100);
        assert_eq!(stats.deallocations(), 40);
        assert_eq!(stats.outstanding(), 60);
    }
}
