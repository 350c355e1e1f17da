//! Error types for allocator construction and control.

use thiserror::Error;

/// Unified cache allocator error type.
///
/// Out-of-memory is not represented here: allocation failure surfaces as a
/// null block from [`crate::CacheAllocator::allocate`], matching the backing
/// allocators' own contracts.
#[derive(Debug, Error)]
pub enum AllocatorError {
    /// Caller-supplied options were rejected before any allocator state
    /// was touched.
    #[error("Invalid allocator options:\n{0}")]
    InvalidArgument(String),

    /// A provisioning step against the backing allocator runtime failed,
    /// carrying that runtime's raw status code.
    #[error("Allocator setup incomplete: {op} returned status {code}")]
    Incomplete { op: &'static str, code: i32 },

    /// The requested allocator is not compiled into this build.
    #[error("Allocator not supported: {0}")]
    NotSupported(&'static str),
}
