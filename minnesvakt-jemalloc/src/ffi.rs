//! ## minnesvakt-jemalloc::ffi
//! **Raw slice of jemalloc's arena control surface**
//!
//! jemalloc 5 steers every raw memory acquisition of an arena through a
//! table of extent hooks. `tikv-jemalloc-sys` declares that table and its
//! hook signatures (`extent_hooks_t`, `extent_alloc_t`) against the stable
//! ABI and guarantees jemalloc >= 5; this module aliases those types and
//! wraps the control interface (`mallctl`), which exchanges the table as a
//! bare pointer.

use std::ffi::{CStr, CString};
use std::mem;
use std::os::raw::{c_int, c_uint, c_void};
use std::ptr;

use tikv_jemalloc_sys::{mallctl, MALLOCX_ARENA, MALLOCX_TCACHE_NONE};

/// Hook-table struct and allocation-hook signature, as jemalloc declares
/// them.
pub(crate) use tikv_jemalloc_sys::{extent_alloc_t as ExtentAlloc, extent_hooks_t as ExtentHooks};

/// Control key that creates a fresh arena and reads back its index.
pub(crate) const ARENAS_CREATE: &CStr = c"arenas.create";

/// Computes the `mallocx`/`dallocx` flag word binding allocations to
/// `arena_index`. `MALLOCX_TCACHE_NONE` keeps allocations out of the
/// thread-local cache so every one of them reaches the arena and its
/// accounting.
pub(crate) fn arena_flags(arena_index: c_uint) -> c_int {
    MALLOCX_ARENA(arena_index as usize) | MALLOCX_TCACHE_NONE
}

/// Builds the control key `arena.<index>.<op>`.
pub(crate) fn arena_key(arena_index: c_uint, op: &str) -> CString {
    // Arena indices and operation names never contain interior NULs.
    CString::new(format!("arena.{arena_index}.{op}")).expect("control key without NUL")
}

/// Reads the control value under `key` into `value`.
///
/// # Safety
///
/// `T` must be exactly the type jemalloc documents for `key`; a mismatch
/// makes jemalloc write through a wrongly sized buffer.
pub(crate) unsafe fn ctl_read<T>(key: &CStr, value: &mut T) -> Result<(), c_int> {
    let mut len = mem::size_of::<T>();
    match mallctl(
        key.as_ptr(),
        value as *mut T as *mut c_void,
        &mut len,
        ptr::null_mut(),
        0,
    ) {
        0 => Ok(()),
        status => Err(status),
    }
}

/// Writes `value` under `key`.
///
/// # Safety
///
/// Same `T` contract as [`ctl_read`].
pub(crate) unsafe fn ctl_write<T>(key: &CStr, value: &T) -> Result<(), c_int> {
    match mallctl(
        key.as_ptr(),
        ptr::null_mut(),
        ptr::null_mut(),
        value as *const T as *mut c_void,
        mem::size_of::<T>(),
    ) {
        0 => Ok(()),
        status => Err(status),
    }
}

/// Fires a void control operation such as `arena.<i>.destroy`.
///
/// # Safety
///
/// `key` must name a void operation; the call carries no buffers.
pub(crate) unsafe fn ctl_trigger(key: &CStr) -> Result<(), c_int> {
    match mallctl(
        key.as_ptr(),
        ptr::null_mut(),
        ptr::null_mut(),
        ptr::null_mut(),
        0,
    ) {
        0 => Ok(()),
        status => Err(status),
    }
}
