//! Typed, copyable handles onto a shared arena.
//!
//! An [`ArenaHandle`] is the whole public face of an arena: a small,
//! cheap-to-clone view that carries an element type for sizing requests
//! and drives the shared state's reference count. Cloning or rebinding
//! never copies memory; the last handle to drop tears the arena down.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use cairn_core::{BackingStore, HeapStore, StoreError, GRANULE};

use crate::config::ArenaConfig;
use crate::state::ArenaState;
use crate::stats::ArenaStats;

/// A typed view onto a shared arena.
///
/// Every handle cloned or rebound from a common origin shares one arena
/// state; handles compare equal exactly when they do, regardless of
/// element type. Memory handed out through any of them is reclaimed only
/// when the last such handle is dropped; [`ArenaHandle::deallocate`] is
/// a notification, not a release.
///
/// The reference count is plain and non-atomic, so handles are neither
/// `Send` nor `Sync`; sharing an arena across threads requires external
/// exclusion around a single owning thread's handles.
///
/// ```
/// use cairn_arena::{ArenaConfig, ArenaHandle};
///
/// let chars: ArenaHandle<u8> = ArenaHandle::with_config(ArenaConfig::new(1024))?;
/// let _region = chars.allocate(16)?;
///
/// // One region can back containers of several element types.
/// let nodes = chars.rebind::<u64>();
/// assert!(nodes == chars);
/// # Ok::<(), cairn_core::StoreError>(())
/// ```
pub struct ArenaHandle<T, S: BackingStore = HeapStore> {
    state: NonNull<ArenaState<S>>,
    /// Element type marker; `*mut T` also keeps the handle `!Send + !Sync`.
    _elem: PhantomData<*mut T>,
}

impl<T> ArenaHandle<T, HeapStore> {
    /// Create a fresh arena on the default heap store.
    pub fn new() -> Result<Self, StoreError> {
        Self::with_store(ArenaConfig::default(), HeapStore)
    }

    /// Create a fresh arena on the default heap store with the given config.
    pub fn with_config(config: ArenaConfig) -> Result<Self, StoreError> {
        Self::with_store(config, HeapStore)
    }
}

impl<T, S: BackingStore> ArenaHandle<T, S> {
    /// Create a fresh arena drawing every buffer, control state included,
    /// from `store`.
    ///
    /// Fails when the store cannot supply the control region or the first
    /// block.
    pub fn with_store(config: ArenaConfig, store: S) -> Result<Self, StoreError> {
        Ok(Self {
            state: ArenaState::create(config, store)?,
            _elem: PhantomData,
        })
    }

    /// Allocate room for `count` elements of `T`.
    ///
    /// The region is uninitialized (never zero-filled) and stays
    /// valid until the arena is torn down. `count == 0` (and any count of
    /// a zero-sized `T`) succeeds with a valid, non-dereferenceable
    /// pointer at the current bump position. The only failure is the
    /// backing store itself: block exhaustion grows the arena silently.
    pub fn allocate(&self, count: usize) -> Result<NonNull<T>, StoreError> {
        const {
            assert!(
                std::mem::align_of::<T>() <= GRANULE,
                "element type is over-aligned for the arena granule"
            )
        };
        let bytes = count
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(StoreError::SizeOverflow {
                requested: usize::MAX,
            })?;
        Ok(self.state().allocate(bytes)?.cast())
    }

    /// Initialize one element in place at an allocated address.
    ///
    /// Construction is decoupled from allocation: the caller owns the
    /// object's lifetime and pairs this with [`ArenaHandle::destroy`].
    ///
    /// # Safety
    ///
    /// `at` must point into a region allocated from this arena with room
    /// for a `T`, and must not already hold a live value.
    pub unsafe fn construct(&self, at: NonNull<T>, value: T) {
        // SAFETY: caller guarantees a valid, dead slot for a `T`.
        unsafe { at.as_ptr().write(value) };
    }

    /// Finalize one element previously initialized with
    /// [`ArenaHandle::construct`].
    ///
    /// Dropping the value does not return its storage; that happens only
    /// at arena teardown.
    ///
    /// # Safety
    ///
    /// `at` must hold a live `T` from this arena, and the value must not
    /// be used or finalized again.
    pub unsafe fn destroy(&self, at: NonNull<T>) {
        // SAFETY: caller guarantees a live value at `at`.
        unsafe { std::ptr::drop_in_place(at.as_ptr()) };
    }

    /// Accept a deallocation notification for `count` elements.
    ///
    /// Never reclaims memory: the region stays reserved until the whole
    /// arena is torn down. Only the notification counter changes.
    pub fn deallocate(&self, _region: NonNull<T>, _count: usize) {
        self.state().note_deallocation();
    }

    /// Largest element count a single request could ever express.
    pub fn max_count(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => usize::MAX,
            size => usize::MAX / size,
        }
    }

    /// A handle for another element type sharing this same arena.
    pub fn rebind<U>(&self) -> ArenaHandle<U, S> {
        self.state().retain();
        ArenaHandle {
            state: self.state,
            _elem: PhantomData,
        }
    }

    /// Snapshot the arena's cumulative counters and chain shape.
    pub fn stats(&self) -> ArenaStats {
        self.state().stats()
    }

    fn state(&self) -> &ArenaState<S> {
        // SAFETY: this handle holds one of the counted references, so the
        // state outlives it.
        unsafe { self.state.as_ref() }
    }
}

impl<T, S: BackingStore> Clone for ArenaHandle<T, S> {
    fn clone(&self) -> Self {
        self.state().retain();
        Self {
            state: self.state,
            _elem: PhantomData,
        }
    }
}

impl<T, S: BackingStore> Drop for ArenaHandle<T, S> {
    fn drop(&mut self) {
        if self.state().release() {
            // SAFETY: the count just reached zero, so this was the last
            // handle and nothing can reach the state after this call.
            unsafe { ArenaState::destroy(self.state) };
        }
    }
}

/// Handles are equal exactly when they share one arena state, whatever
/// their element types.
impl<T, U, S: BackingStore> PartialEq<ArenaHandle<U, S>> for ArenaHandle<T, S> {
    fn eq(&self, other: &ArenaHandle<U, S>) -> bool {
        std::ptr::eq(self.state.as_ptr(), other.state.as_ptr())
    }
}

impl<T, S: BackingStore> Eq for ArenaHandle<T, S> {}

impl<T, S: BackingStore> fmt::Debug for ArenaHandle<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaHandle")
            .field("state", &self.state.as_ptr())
            .field("stats", &self.stats())
            .finish()
    }
}
