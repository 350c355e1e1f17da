//! ## minnesvakt-jemalloc::hooks
//! **The extent-allocation interceptor and its process-wide delegate slot**
//!
//! jemalloc's hook model passes no per-instance closure state: a replacement
//! hook is one bare function shared by every arena that installs it. The
//! single piece of mutable state that function needs is the default
//! allocation hook it delegates to; that hook lives in a process-wide slot,
//! published once by the first successful provisioning and read by every
//! interception afterwards.

use std::io;
use std::mem;
use std::os::raw::{c_uint, c_void};
use std::process;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::ffi::{ExtentAlloc, ExtentHooks};

/// The allocation hook captured from the first arena provisioned by this
/// crate. Every arena created through this mechanism observes the same
/// default hook table, so one slot serves them all; divergence is a logic
/// error, not a recoverable condition.
static ORIGINAL_ALLOC: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Publishes `hook` as the process-wide original allocation hook.
///
/// The first caller wins the compare-and-set; later callers must be
/// bringing the identical value, anything else aborts via the assertion.
pub(crate) fn publish_original_alloc(hook: ExtentAlloc) {
    let raw = hook as *mut ();
    if let Err(existing) =
        ORIGINAL_ALLOC.compare_exchange(ptr::null_mut(), raw, Ordering::AcqRel, Ordering::Acquire)
    {
        assert!(
            existing == raw,
            "arenas observed divergent original extent-allocation hooks"
        );
    }
}

/// Replacement extent-allocation hook installed into every arena provisioned
/// by this crate.
///
/// Delegates the actual mapping to the captured original hook, then marks
/// the returned range as excluded from core dumps. A failed advisory aborts
/// the process: an allocation must never half-succeed with the cached data
/// still eligible for dumps, because silent inclusion is the exact failure
/// this allocator exists to prevent.
///
/// Runs inside jemalloc's extent path, concurrently from any allocating
/// thread. It holds no state beyond the shared slot, and its only permitted
/// diagnostic is a direct stderr write on the way to `abort`.
pub(crate) unsafe extern "C" fn nodump_extent_alloc(
    extent_hooks: *mut ExtentHooks,
    new_addr: *mut c_void,
    size: usize,
    alignment: usize,
    zero: *mut bool,
    commit: *mut bool,
    arena_index: c_uint,
) -> *mut c_void {
    let raw = ORIGINAL_ALLOC.load(Ordering::Relaxed);
    if raw.is_null() {
        eprintln!("minnesvakt-jemalloc: extent hook invoked before any arena was provisioned");
        process::abort();
    }
    let original: ExtentAlloc = mem::transmute(raw);

    let result = original(extent_hooks, new_addr, size, alignment, zero, commit, arena_index);
    if !result.is_null() && libc::madvise(result, size, libc::MADV_DONTDUMP) != 0 {
        let err = io::Error::last_os_error();
        eprintln!(
            "minnesvakt-jemalloc: failed to exclude extent {result:p} ({size} bytes) from core dumps: {err}"
        );
        process::abort();
    }
    result
}

/// Current slot value, for tests. Tests must reach the slot only through
/// real arena provisioning: publishing a synthetic hook would poison the
/// process-wide value for every other test in the binary.
#[cfg(test)]
pub(crate) fn original_alloc_raw() -> *mut () {
    ORIGINAL_ALLOC.load(Ordering::Relaxed)
}
