//! ## minnesvakt-core::default
//! **Global-heap implementation of the cache allocator capability**
//!
//! Baseline backend for callers that want the uniform interface without a
//! specialized arena. The capability contract hands `deallocate` nothing but
//! the pointer, so each block carries a small header recording the size the
//! caller asked for; that header is what lets the matching layout be rebuilt
//! on release.

use std::alloc::{alloc, dealloc, Layout};
use std::mem;
use std::ptr;

use crate::allocator::CacheAllocator;
use crate::stats::AllocationStats;

/// Header stored immediately ahead of every block handed out by
/// [`DefaultCacheAllocator`]. Padded so the caller-visible pointer keeps the
/// 16-byte alignment the specialized backends provide for cache payloads.
#[repr(C, align(16))]
struct BlockHeader {
    size: usize,
}

const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Cache allocator backed by the process global heap.
pub struct DefaultCacheAllocator {
    stats: AllocationStats,
}

impl DefaultCacheAllocator {
    /// Creates a new global-heap cache allocator.
    pub fn new() -> Self {
        DefaultCacheAllocator {
            stats: AllocationStats::new(),
        }
    }

    /// Allocation counters for this instance.
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }
}

impl Default for DefaultCacheAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheAllocator for DefaultCacheAllocator {
    fn name(&self) -> &'static str {
        "default-heap"
    }

    unsafe fn allocate(&self, size: usize) -> *mut u8 {
        let total = match size.checked_add(HEADER_SIZE) {
            Some(total) => total,
            None => return ptr::null_mut(),
        };
        let layout = match Layout::from_size_align(total, mem::align_of::<BlockHeader>()) {
            Ok(layout) => layout,
            Err(_) => return ptr::null_mut(),
        };
        let base = alloc(layout);
        if base.is_null() {
            return ptr::null_mut();
        }
        (base as *mut BlockHeader).write(BlockHeader { size });
        self.stats.record_allocation();
        base.add(HEADER_SIZE)
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        let base = ptr.sub(HEADER_SIZE);
        let size = (*(base as *const BlockHeader)).size;
        // The total fit in a Layout at allocation time, so it still does.
        let layout =
            Layout::from_size_align_unchecked(size + HEADER_SIZE, mem::align_of::<BlockHeader>());
        dealloc(base, layout);
        self.stats.record_deallocation();
    }

    unsafe fn usable_size(&self, ptr: *mut u8, _allocation_size: usize) -> usize {
        (*(ptr.sub(HEADER_SIZE) as *const BlockHeader)).size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trips_data_through_an_allocated_block() {
        let allocator = DefaultCacheAllocator::new();
        unsafe {
            let ptr = allocator.allocate(256);
            assert!(!ptr.is_null());
            for i in 0..256 {
                *ptr.add(i) = (i % 251) as u8;
            }
            for i in 0..256 {
                assert_eq!(*ptr.add(i), (i % 251) as u8);
            }
            allocator.deallocate(ptr);
        }
    }

    #[test]
    fn usable_size_reports_the_stored_request() {
        let allocator = DefaultCacheAllocator::new();
        unsafe {
            let ptr = allocator.allocate(5000);
            assert!(!ptr.is_null());
            assert_eq!(allocator.usable_size(ptr, 5000), 5000);
            allocator.deallocate(ptr);
        }
    }

    #[test]
    fn blocks_keep_cache_payload_alignment() {
        let allocator = DefaultCacheAllocator::new();
        unsafe {
            let ptr = allocator.allocate(40);
            assert!(!ptr.is_null());
            assert_eq!(ptr as usize % 16, 0);
            allocator.deallocate(ptr);
        }
    }

    #[test]
    fn stats_track_outstanding_blocks() {
        let allocator = DefaultCacheAllocator::new();
        unsafe {
            let first = allocator.allocate(64);
            let second = allocator.allocate(128);
            assert_eq!(allocator.stats().outstanding(), 2);
            allocator.deallocate(first);
            assert_eq!(allocator.stats().outstanding(), 1);
            allocator.deallocate(second);
        }
        assert_eq!(allocator.stats().allocations(), 2);
        assert_eq!(allocator.stats().outstanding(), 0);
    }

    #[test]
    fn impossible_requests_surface_as_null() {
        let allocator = DefaultCacheAllocator::new();
        unsafe {
            // Overflows the header arithmetic.
            assert!(allocator.allocate(usize::MAX).is_null());
            // Fits in a usize but no layout can describe it.
            assert!(allocator.allocate(usize::MAX - 64).is_null());
        }
        assert_eq!(allocator.stats().allocations(), 0);
    }

    proptest! {
        #[test]
        fn usable_size_never_undersells(size in 1usize..=65536) {
            let allocator = DefaultCacheAllocator::new();
            unsafe {
                let ptr = allocator.allocate(size);
                prop_assert!(!ptr.is_null());
                *ptr = 0xA5;
                *ptr.add(size - 1) = 0x5A;
                prop_assert!(allocator.usable_size(ptr, size) >= size);
                allocator.deallocate(ptr);
            }
        }
    }
}
