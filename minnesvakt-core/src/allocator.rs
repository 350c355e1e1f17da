//! ## minnesvakt-core::allocator
//! **The capability interface implemented by every cache memory backend**
//!
//! Cache blocks are large and long-lived, and the cache that allocated a
//! block is the only party that ever frees it. That narrow contract is what
//! this trait captures: raw allocate/deallocate/usable-size, nothing of the
//! full `GlobalAlloc` protocol.

/// Pluggable allocator for cache memory.
///
/// All methods may be called concurrently from any thread; implementations
/// defer to their backing allocator's own synchronization.
pub trait CacheAllocator: Send + Sync {
    /// Name of the allocator, for diagnostics.
    fn name(&self) -> &'static str;

    /// Allocates a block of at least `size` bytes, or returns null if the
    /// backing allocator is out of memory. Alignment follows the backing
    /// allocator's default policy for the size class.
    ///
    /// # Safety
    ///
    /// `size` must be nonzero.
    unsafe fn allocate(&self, size: usize) -> *mut u8;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been obtained from [`CacheAllocator::allocate`] on
    /// this same instance and not deallocated since.
    unsafe fn deallocate(&self, ptr: *mut u8);

    /// Actual usable size of the block at `ptr`, which may exceed
    /// `allocation_size` when the backing allocator rounds requests up to a
    /// size class. Backends without size-class knowledge report the
    /// requested size unchanged.
    ///
    /// # Safety
    ///
    /// Same pointer contract as [`CacheAllocator::deallocate`].
    unsafe fn usable_size(&self, _ptr: *mut u8, allocation_size: usize) -> usize {
        allocation_size
    }
}
