//! A fixed-capacity store over one pre-reserved region.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::Cell;
use std::ptr::NonNull;

use crate::error::StoreError;
use crate::granule::{round_up, GRANULE};
use crate::store::BackingStore;

/// A [`BackingStore`] that bump-allocates from a single pre-reserved region.
///
/// The full capacity is reserved once at construction and handed out in
/// granule-aligned slices. [`BackingStore::deallocate`] is a no-op: the
/// whole reservation is released as a unit when the store is dropped,
/// outside the arena's own lifecycle. Once the region is full,
/// `allocate` fails with [`StoreError::CapacityExceeded`].
///
/// This is the store to reach for when the arena's memory must come from a
/// pre-sized domain rather than the general-purpose heap; the reservation
/// itself is obtained through the global allocator for portability.
pub struct ReservedStore {
    /// Base of the reservation. Granule-aligned.
    base: NonNull<u8>,
    /// Total reservation size in bytes. Granule-rounded.
    capacity: usize,
    /// Next free byte within the reservation.
    cursor: Cell<usize>,
}

impl ReservedStore {
    /// Reserve a region of at least `capacity` bytes.
    ///
    /// The capacity is rounded up to the granule and fixed for the life of
    /// the store.
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        let capacity = round_up(capacity.max(1)).ok_or(StoreError::SizeOverflow {
            requested: capacity,
        })?;
        let layout = Layout::from_size_align(capacity, GRANULE)
            .map_err(|_| StoreError::SizeOverflow {
                requested: capacity,
            })?;
        // SAFETY: the layout has non-zero size.
        let ptr = unsafe { alloc(layout) };
        let base = NonNull::new(ptr).ok_or(StoreError::OutOfMemory {
            requested: capacity,
        })?;
        Ok(Self {
            base,
            capacity,
            cursor: Cell::new(0),
        })
    }

    /// Total reservation size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out so far.
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor.get()
    }
}

impl BackingStore for ReservedStore {
    fn allocate(&self, bytes: usize) -> Result<NonNull<u8>, StoreError> {
        let rounded =
            round_up(bytes.max(1)).ok_or(StoreError::SizeOverflow { requested: bytes })?;
        let cursor = self.cursor.get();
        let end = cursor
            .checked_add(rounded)
            .ok_or(StoreError::SizeOverflow { requested: bytes })?;
        if end > self.capacity {
            return Err(StoreError::CapacityExceeded {
                requested: bytes,
                capacity: self.capacity,
            });
        }
        // SAFETY: `cursor < capacity` here, so the offset stays inside the
        // reservation and the result is non-null.
        let region = unsafe { NonNull::new_unchecked(self.base.as_ptr().add(cursor)) };
        self.cursor.set(end);
        Ok(region)
    }

    unsafe fn deallocate(&self, _region: NonNull<u8>, _bytes: usize) {
        // Individual regions are never reclaimed; the reservation is
        // released as a unit when the store is dropped.
    }
}

impl Drop for ReservedStore {
    fn drop(&mut self) {
        let layout = Layout::from_size_align(self.capacity, GRANULE)
            .expect("capacity was validated at construction");
        // SAFETY: `base` was obtained from `alloc` with this same layout
        // and is released exactly once, here.
        unsafe { dealloc(self.base.as_ptr(), layout) };
    }
}
