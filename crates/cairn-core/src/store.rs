//! The backing-store capability trait.

use std::ptr::NonNull;

use crate::error::StoreError;

/// A pluggable source and sink of raw memory.
///
/// The arena draws every buffer it owns from one store instance: block
/// buffers and, because the control object is self-hosted, the storage of
/// the arena state itself. A store must therefore be fully constructed
/// before the arena that embeds it and must remain usable until the final
/// region is released during teardown.
///
/// Implementations take `&self`: a store is shared by everything the arena
/// hands out, so any internal bookkeeping (such as [`ReservedStore`]'s bump
/// cursor) uses single-threaded interior mutability.
///
/// [`ReservedStore`]: crate::ReservedStore
pub trait BackingStore {
    /// Obtain a region of at least `bytes` bytes, aligned to [`GRANULE`].
    ///
    /// Zero-byte requests are widened to one granule so every returned
    /// region has a distinct address.
    ///
    /// [`GRANULE`]: crate::GRANULE
    fn allocate(&self, bytes: usize) -> Result<NonNull<u8>, StoreError>;

    /// Release a region previously obtained from this store.
    ///
    /// # Safety
    ///
    /// `region` must have been returned by [`BackingStore::allocate`] on
    /// this same store with the same `bytes`, must not have been released
    /// already, and must not be accessed after this call.
    unsafe fn deallocate(&self, region: NonNull<u8>, bytes: usize);
}
