//! Fallback factory for builds without the jemalloc arena machinery.
//!
//! Compiled when the `jemalloc` feature is off or the target OS lacks
//! `MADV_DONTDUMP`. The factory keeps its signature so call sites stay
//! identical across builds; it reports `NotSupported` without touching any
//! allocator state.

use std::sync::Arc;

use minnesvakt_core::{AllocatorError, CacheAllocator};

use crate::options::NodumpAllocatorOptions;

/// Reports that the dump-excluding allocator is unavailable in this build.
pub fn new_nodump_allocator(
    _options: &NodumpAllocatorOptions,
) -> Result<Arc<dyn CacheAllocator>, AllocatorError> {
    Err(AllocatorError::NotSupported(
        "jemalloc nodump allocator requires jemalloc >= 5 and MADV_DONTDUMP",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_reports_not_supported() {
        match new_nodump_allocator(&NodumpAllocatorOptions::default()) {
            Err(AllocatorError::NotSupported(reason)) => {
                assert!(reason.contains("MADV_DONTDUMP"));
            }
            Err(other) => panic!("expected NotSupported, got {other}"),
            Ok(_) => panic!("unsupported build produced an allocator"),
        }
    }
}
