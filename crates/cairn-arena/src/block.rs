//! Fixed-capacity backing blocks with bump allocation.
//!
//! A [`Block`] is one contiguous buffer obtained from a
//! [`BackingStore`], carved up by advancing a cursor. Blocks are never
//! shrunk or recycled mid-flight; their buffers go back to the store only
//! during whole-arena teardown.

use std::ptr::NonNull;

use cairn_core::{round_up, BackingStore, StoreError};

/// A single backing buffer with a bump cursor.
///
/// The cursor only ever advances, so two successful allocations from the
/// same block can never overlap. A block that cannot fit a request reports
/// the miss to its owner and is left untouched; the arena responds by
/// appending a fresh block, never by reworking this one.
pub struct Block {
    /// Buffer obtained from the backing store. Granule-aligned.
    buf: NonNull<u8>,
    /// Buffer size in bytes. Granule-rounded at creation.
    capacity: usize,
    /// Bytes handed out so far.
    offset: usize,
}

impl Block {
    /// Create a block with room for at least `bytes` bytes.
    ///
    /// The capacity is rounded up to the granule before the buffer is
    /// requested from `store`.
    pub fn new<S: BackingStore>(bytes: usize, store: &S) -> Result<Self, StoreError> {
        let capacity = round_up(bytes).ok_or(StoreError::SizeOverflow { requested: bytes })?;
        let buf = store.allocate(capacity)?;
        Ok(Self {
            buf,
            capacity,
            offset: 0,
        })
    }

    /// Bump-allocate `bytes` bytes from this block.
    ///
    /// The request is rounded up to the granule so the returned address is
    /// naturally aligned for any scalar type. Returns `None`, with no side
    /// effect, if the rounded request does not fit. A zero-byte request
    /// succeeds at the current cursor without advancing it.
    pub fn allocate(&mut self, bytes: usize) -> Option<NonNull<u8>> {
        let rounded = round_up(bytes)?;
        let end = self.offset.checked_add(rounded)?;
        if end > self.capacity {
            return None;
        }
        // SAFETY: `offset <= capacity`, so the address stays inside the
        // buffer (or one past it for a zero-byte request at the very end)
        // and is derived from a non-null base.
        let region = unsafe { NonNull::new_unchecked(self.buf.as_ptr().add(self.offset)) };
        self.offset = end;
        Some(region)
    }

    /// Return the buffer to the store this block was carved from.
    ///
    /// # Safety
    ///
    /// `store` must be the store that created this block, and no region
    /// previously handed out by the block may be accessed afterwards.
    pub unsafe fn dispose<S: BackingStore>(self, store: &S) {
        // SAFETY: `buf` came from `store.allocate(capacity)` and consuming
        // `self` makes this the final use of the buffer.
        unsafe { store.deallocate(self.buf, self.capacity) };
    }

    /// Bytes handed out so far.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Buffer size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{HeapStore, GRANULE};

    #[test]
    fn first_allocation_starts_at_the_buffer_base() {
        let store = HeapStore;
        let mut block = Block::new(1024, &store).unwrap();
        let region = block.allocate(10).unwrap();
        assert_eq!(region.as_ptr() as usize % GRANULE, 0);
        assert_eq!(block.used(), round_up(10).unwrap());
        unsafe { block.dispose(&store) };
    }

    #[test]
    fn sequential_allocations_do_not_overlap() {
        let store = HeapStore;
        let mut block = Block::new(1024, &store).unwrap();
        let a = block.allocate(24).unwrap();
        let b = block.allocate(40).unwrap();
        let gap = b.as_ptr() as usize - a.as_ptr() as usize;
        assert!(gap >= 24);
        assert_eq!(gap % GRANULE, 0);
        unsafe { block.dispose(&store) };
    }

    #[test]
    fn capacity_is_granule_rounded() {
        let store = HeapStore;
        let block = Block::new(100, &store).unwrap();
        assert_eq!(block.capacity() % GRANULE, 0);
        assert!(block.capacity() >= 100);
        unsafe { block.dispose(&store) };
    }

    #[test]
    fn a_miss_leaves_the_block_untouched() {
        let store = HeapStore;
        let mut block = Block::new(GRANULE * 4, &store).unwrap();
        block.allocate(GRANULE * 3).unwrap();
        let used = block.used();
        assert!(block.allocate(GRANULE * 2).is_none());
        assert_eq!(block.used(), used);
        unsafe { block.dispose(&store) };
    }

    #[test]
    fn exact_fit_succeeds() {
        let store = HeapStore;
        let mut block = Block::new(GRANULE * 4, &store).unwrap();
        assert!(block.allocate(GRANULE * 4).is_some());
        assert_eq!(block.remaining(), 0);
        unsafe { block.dispose(&store) };
    }

    #[test]
    fn zero_byte_request_does_not_advance_the_cursor() {
        let store = HeapStore;
        let mut block = Block::new(256, &store).unwrap();
        block.allocate(8).unwrap();
        let used = block.used();
        let region = block.allocate(0).unwrap();
        assert_eq!(block.used(), used);
        // The sentinel sits at the current cursor, inside the buffer.
        assert_eq!(region.as_ptr() as usize % GRANULE, 0);
        unsafe { block.dispose(&store) };
    }

    #[test]
    fn writes_land_in_the_returned_region() {
        let store = HeapStore;
        let mut block = Block::new(256, &store).unwrap();
        let region = block.allocate(4).unwrap();
        unsafe {
            region.as_ptr().write_bytes(0x5A, 4);
            assert_eq!(*region.as_ptr(), 0x5A);
            assert_eq!(*region.as_ptr().add(3), 0x5A);
            block.dispose(&store);
        }
    }
}
