//! # minnesvakt-core
//!
//! Capability surface for cache memory allocation.
//! Built so higher-level caches can swap allocation strategies without
//! touching their own block management.
//!
//! ### Expectations (Production):
//! - Allocation and deallocation safe from any thread
//! - Out-of-memory surfaces as a null block, never a panic
//! - Usable size never smaller than the requested size
//!
//! ### Key Submodules:
//! - `allocator`: the `CacheAllocator` trait implemented by every backend
//! - `default`: global-heap backend for callers without a specialized arena
//! - `stats`: allocation counters shared by all backends
//! - `error`: the unified `AllocatorError` type

pub mod allocator;
pub mod default;
pub mod error;
pub mod stats;

pub mod prelude {
    pub use crate::allocator::*;
    pub use crate::default::*;
    pub use crate::error::*;
    pub use crate::stats::*;
}

pub use allocator::CacheAllocator;
pub use default::DefaultCacheAllocator;
pub use error::AllocatorError;
pub use stats::AllocationStats;
