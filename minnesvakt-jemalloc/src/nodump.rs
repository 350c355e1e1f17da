//! ## minnesvakt-jemalloc::nodump
//! **Arena provisioning and the dump-excluding allocator object**
//!
//! Provisioning is a strictly ordered conversation with jemalloc's control
//! interface: create an arena, capture its default extent-allocation hook,
//! publish that hook process-wide, then install a privately owned hook table
//! whose allocation entry is the dump-excluding interceptor. The resulting
//! allocator owns the arena for its whole lifetime and destroys it on drop.

use std::os::raw::{c_int, c_uint, c_void};
use std::ptr;
use std::sync::Arc;

use tikv_jemalloc_sys::{dallocx, malloc_usable_size, mallocx};
use tracing::{debug, error, warn};

use minnesvakt_core::{AllocationStats, AllocatorError, CacheAllocator};

use crate::ffi::{self, ExtentHooks};
use crate::hooks;
use crate::options::NodumpAllocatorOptions;

/// Cache allocator whose memory never appears in core dumps.
///
/// Each instance owns one jemalloc arena. Every extent the arena maps is
/// advised `MADV_DONTDUMP` by the installed hook, and every allocation is
/// bound to the arena with thread-caching disabled, so no block can bypass
/// it.
pub struct NodumpAllocator {
    arena_index: c_uint,
    flags: c_int,
    stats: AllocationStats,
    // jemalloc retains a raw pointer to this table, not a copy. It must stay
    // allocated until the arena is destroyed; Rust drops it only after
    // `Drop::drop` has issued the destroy.
    hooks: Box<ExtentHooks>,
}

impl NodumpAllocator {
    /// Provisions a dedicated jemalloc arena and installs the dump-excluding
    /// extent hook into it.
    ///
    /// Any failing step surfaces as [`AllocatorError::Incomplete`] carrying
    /// jemalloc's status code. No rollback is attempted once the arena
    /// exists: a failed later step leaves the fresh arena behind.
    /// Construction is expected at process start, where an idle leaked arena
    /// after a fatal configuration problem costs address space, not
    /// correctness.
    pub fn new(options: &NodumpAllocatorOptions) -> Result<Self, AllocatorError> {
        options.check()?;

        // Create the arena.
        let mut arena_index: c_uint = 0;
        unsafe { ffi::ctl_read(ffi::ARENAS_CREATE, &mut arena_index) }.map_err(|code| {
            AllocatorError::Incomplete {
                op: "arenas.create",
                code,
            }
        })?;
        assert_ne!(arena_index, 0, "jemalloc handed out the reserved default arena");

        let flags = ffi::arena_flags(arena_index);

        if options.retain_grow_limit > 0 {
            let key = ffi::arena_key(arena_index, "retain_grow_limit");
            unsafe { ffi::ctl_write(&key, &options.retain_grow_limit) }.map_err(|code| {
                AllocatorError::Incomplete {
                    op: "arena.retain_grow_limit",
                    code,
                }
            })?;
        }

        // Read the arena's current hook table.
        let key = ffi::arena_key(arena_index, "extent_hooks");
        let mut current: *mut ExtentHooks = ptr::null_mut();
        unsafe { ffi::ctl_read(&key, &mut current) }.map_err(|code| {
            AllocatorError::Incomplete {
                op: "arena.extent_hooks read",
                code,
            }
        })?;

        // Capture the default allocation hook and publish it process-wide.
        let original = unsafe { (*current).alloc }
            .expect("arena reported an extent-hook table without an allocation hook");
        hooks::publish_original_alloc(original);

        // Install a privately owned copy with the allocation entry replaced.
        let mut table = Box::new(unsafe { *current });
        table.alloc = Some(hooks::nodump_extent_alloc);
        let table_ptr: *mut ExtentHooks = &mut *table;
        unsafe { ffi::ctl_write(&key, &table_ptr) }.map_err(|code| {
            AllocatorError::Incomplete {
                op: "arena.extent_hooks write",
                code,
            }
        })?;

        debug!("provisioned dump-excluded jemalloc arena {arena_index}");
        Ok(NodumpAllocator {
            arena_index,
            flags,
            stats: AllocationStats::new(),
            hooks: table,
        })
    }

    /// Index of the jemalloc arena owned by this allocator. Never zero.
    pub fn arena_index(&self) -> u32 {
        self.arena_index
    }

    /// Allocation counters for this instance.
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    #[cfg(test)]
    pub(crate) fn hook_table_ptr(&self) -> *const ExtentHooks {
        &*self.hooks
    }
}

impl CacheAllocator for NodumpAllocator {
    fn name(&self) -> &'static str {
        "jemalloc-nodump"
    }

    unsafe fn allocate(&self, size: usize) -> *mut u8 {
        let ptr = mallocx(size, self.flags) as *mut u8;
        if !ptr.is_null() {
            self.stats.record_allocation();
        }
        ptr
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        dallocx(ptr as *mut c_void, self.flags);
        self.stats.record_deallocation();
    }

    unsafe fn usable_size(&self, ptr: *mut u8, _allocation_size: usize) -> usize {
        malloc_usable_size(ptr as *const c_void)
    }
}

impl Drop for NodumpAllocator {
    /// Destroys the owned arena.
    ///
    /// A failed destroy is logged, never propagated. Dropping while blocks
    /// from this arena are still outstanding invalidates those blocks
    /// (inherited from `arena.<i>.destroy`); touching them afterwards is
    /// undefined behavior.
    fn drop(&mut self) {
        let outstanding = self.stats.outstanding();
        if outstanding != 0 {
            warn!(
                "destroying jemalloc arena {} with {outstanding} outstanding allocations",
                self.arena_index
            );
        }
        let key = ffi::arena_key(self.arena_index, "destroy");
        if let Err(code) = unsafe { ffi::ctl_trigger(&key) } {
            error!("failed to destroy jemalloc arena {}: status {code}", self.arena_index);
        }
        // `self.hooks` is released after this body, once the arena no longer
        // references it.
    }
}

/// Builds a dump-excluding allocator behind the capability interface.
///
/// This is the uniform entry point across platforms; builds without
/// jemalloc 5 or `MADV_DONTDUMP` replace it with a variant that always
/// reports `NotSupported`.
pub fn new_nodump_allocator(
    options: &NodumpAllocatorOptions,
) -> Result<Arc<dyn CacheAllocator>, AllocatorError> {
    let allocator = NodumpAllocator::new(options)?;
    Ok(Arc::new(allocator))
}
