//! # minnesvakt-jemalloc
//!
//! Dump-excluded cache memory backed by a dedicated jemalloc arena.
//!
//! Diagnostic core dumps of a running process must not leak cached
//! application data. This crate provisions its own jemalloc arena, replaces
//! the arena's extent-allocation hook with one that marks every freshly
//! mapped extent `MADV_DONTDUMP`, and otherwise stays interchangeable with
//! the general-purpose allocator: same size classes, same memory reuse.
//!
//! ### Expectations (Production):
//! - Provisioned once at process start; arenas live as long as their cache
//! - Allocation cost within jemalloc's ordinary `mallocx` envelope
//! - A failed dump-exclusion advisory aborts the process rather than letting
//!   cached data silently re-enter dumps
//!
//! ### Key Submodules:
//! - `nodump`: arena provisioning and the allocator object
//! - `hooks`: the extent-allocation interceptor and the process-wide
//!   original hook slot
//! - `ffi`: jemalloc's arena control surface (`mallctl` keys, extent-hook ABI)
//! - `options`: construction options with validation
//!
//! Builds without the `jemalloc` feature, or on targets without
//! `MADV_DONTDUMP`, compile a fallback factory that uniformly reports
//! `NotSupported`.

#[cfg(all(feature = "jemalloc", target_os = "linux"))]
mod ffi;
#[cfg(all(feature = "jemalloc", target_os = "linux"))]
mod hooks;
#[cfg(all(feature = "jemalloc", target_os = "linux"))]
mod nodump;
mod options;
#[cfg(not(all(feature = "jemalloc", target_os = "linux")))]
mod unsupported;

pub use options::NodumpAllocatorOptions;

#[cfg(all(feature = "jemalloc", target_os = "linux"))]
pub use nodump::{new_nodump_allocator, NodumpAllocator};
#[cfg(not(all(feature = "jemalloc", target_os = "linux")))]
pub use unsupported::new_nodump_allocator;
