//! The default, global-allocator-backed store.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use crate::error::StoreError;
use crate::granule::{round_up, GRANULE};
use crate::store::BackingStore;

/// A [`BackingStore`] that draws regions from the global allocator.
///
/// This is the default store: each region is one `alloc` call with a
/// granule-aligned layout, released with the matching `dealloc` during
/// arena teardown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStore;

/// Granule-aligned layout for a request of `bytes` bytes.
///
/// Zero-byte requests are widened to one granule so the layout always has
/// a non-zero size.
fn region_layout(bytes: usize) -> Result<Layout, StoreError> {
    let size = round_up(bytes.max(1)).ok_or(StoreError::SizeOverflow { requested: bytes })?;
    Layout::from_size_align(size, GRANULE)
        .map_err(|_| StoreError::SizeOverflow { requested: bytes })
}

impl BackingStore for HeapStore {
    fn allocate(&self, bytes: usize) -> Result<NonNull<u8>, StoreError> {
        let layout = region_layout(bytes)?;
        // SAFETY: `region_layout` never produces a zero-size layout.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or(StoreError::OutOfMemory { requested: bytes })
    }

    unsafe fn deallocate(&self, region: NonNull<u8>, bytes: usize) {
        let layout = region_layout(bytes)
            .expect("deallocate mirrors a successful allocate, so the layout is valid");
        // SAFETY: per the trait contract, `region` came from `allocate` on
        // this store with the same `bytes`, which used this same layout.
        unsafe { dealloc(region.as_ptr(), layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_region_is_granule_aligned() {
        let store = HeapStore;
        let region = store.allocate(100).unwrap();
        assert_eq!(region.as_ptr() as usize % GRANULE, 0);
        unsafe { store.deallocate(region, 100) };
    }

    #[test]
    fn zero_byte_request_yields_a_real_region() {
        let store = HeapStore;
        let region = store.allocate(0).unwrap();
        unsafe { store.deallocate(region, 0) };
    }

    #[test]
    fn regions_are_writable_across_full_length() {
        let store = HeapStore;
        let bytes = 256;
        let region = store.allocate(bytes).unwrap();
        unsafe {
            std::ptr::write_bytes(region.as_ptr(), 0xAB, bytes);
            assert_eq!(*region.as_ptr(), 0xAB);
            assert_eq!(*region.as_ptr().add(bytes - 1), 0xAB);
            store.deallocate(region, bytes);
        }
    }

    #[test]
    fn oversized_request_reports_overflow() {
        let store = HeapStore;
        let result = store.allocate(usize::MAX);
        assert!(matches!(result, Err(StoreError::SizeOverflow { .. })));
    }
}
