//! The shared, refcounted arena control object.
//!
//! One [`ArenaState`] backs every handle copied or rebound from a common
//! origin. The state is self-hosted: its own storage comes from the
//! backing store it manages, so the whole arena, metadata included, lives
//! in whatever memory domain the store draws from. Construction and
//! teardown are sequenced around that: the store exists before the state
//! it will contain, and outlives the final block release.

use std::cell::{Cell, RefCell};
use std::ptr::{self, NonNull};

use cairn_core::{round_up, BackingStore, StoreError, GRANULE};
use smallvec::SmallVec;

use crate::block::Block;
use crate::config::ArenaConfig;
use crate::stats::{ArenaStats, Counters};

/// The block chain rarely grows past a handful of entries.
type BlockChain = SmallVec<[Block; 4]>;

/// Shared control object for one arena.
///
/// Holds the backing store, the append-only block chain (the last entry is
/// the current block), the plain reference count, and the usage counters.
/// All mutation goes through single-threaded interior mutability; the
/// count is plain and non-atomic, so cross-thread sharing is ruled out
/// at the handle type rather than supported here.
pub(crate) struct ArenaState<S: BackingStore> {
    store: S,
    block_size: usize,
    blocks: RefCell<BlockChain>,
    refs: Cell<usize>,
    counters: Counters,
}

impl<S: BackingStore> ArenaState<S> {
    /// Create a fresh state inside storage drawn from `store`.
    ///
    /// The store is asked for the control region first, then for the first
    /// block; only then is the state written into its self-hosted region.
    /// The returned pointer carries a reference count of one.
    pub(crate) fn create(config: ArenaConfig, store: S) -> Result<NonNull<Self>, StoreError> {
        const {
            assert!(
                std::mem::align_of::<Self>() <= GRANULE,
                "the backing store type is over-aligned for store-hosted state"
            )
        };

        let control_bytes = Self::control_bytes();
        let region = store.allocate(control_bytes)?;
        let state = Self {
            store,
            block_size: config.block_size.max(ArenaConfig::MIN_BLOCK_SIZE),
            blocks: RefCell::new(BlockChain::new()),
            refs: Cell::new(1),
            counters: Counters::default(),
        };
        let first = match Block::new(state.block_size, &state.store) {
            Ok(block) => block,
            Err(err) => {
                // SAFETY: `region` came from this store with `control_bytes`
                // and was never written to.
                unsafe { state.store.deallocate(region, control_bytes) };
                return Err(err);
            }
        };
        state.blocks.borrow_mut().push(first);

        let target = region.cast::<Self>();
        // SAFETY: the region is granule-aligned (store contract), the
        // granule covers `align_of::<Self>()` (compile-time assertion
        // above), and it was sized for `Self` and is unaliased.
        unsafe { ptr::write(target.as_ptr(), state) };
        Ok(target)
    }

    /// Tear the arena down.
    ///
    /// Every block buffer and the control region itself go back through
    /// the store, and the store is dropped last.
    ///
    /// # Safety
    ///
    /// `state` must have come from [`ArenaState::create`], the reference
    /// count must have reached zero, and nothing may use `state` afterwards.
    pub(crate) unsafe fn destroy(state: NonNull<Self>) {
        // Move the state out of its self-hosted region so the region can
        // be returned through the store before the store itself is dropped.
        // SAFETY: per the caller contract this is the sole owner.
        let owned = unsafe { ptr::read(state.as_ptr()) };
        let Self { store, blocks, .. } = owned;
        for block in blocks.into_inner() {
            // SAFETY: every block buffer came from this store and is
            // released exactly once, here.
            unsafe { block.dispose(&store) };
        }
        // SAFETY: the control region came from this store at create time
        // with this same size, and `owned` has already been moved out of it.
        unsafe { store.deallocate(state.cast(), Self::control_bytes()) };
    }

    /// Serve `bytes` from the current block, growing the chain on a miss.
    ///
    /// A fresh block is sized to twice the request when the request is
    /// larger than half the default block size (so one oversized request
    /// does not strand a default-sized block), and to the default size
    /// otherwise. The retry after growth cannot miss.
    pub(crate) fn allocate(&self, bytes: usize) -> Result<NonNull<u8>, StoreError> {
        let mut blocks = self.blocks.borrow_mut();
        let current = blocks
            .last_mut()
            .expect("an arena always holds at least one block");
        if let Some(region) = current.allocate(bytes) {
            self.counters.record_allocation(bytes);
            return Ok(region);
        }

        let block_bytes = if bytes > self.block_size / 2 {
            bytes
                .checked_mul(2)
                .ok_or(StoreError::SizeOverflow { requested: bytes })?
        } else {
            self.block_size
        };
        let mut fresh = Block::new(block_bytes, &self.store)?;
        let region = fresh
            .allocate(bytes)
            .expect("a fresh block is sized to fit the request that grew it");
        blocks.push(fresh);
        self.counters.record_allocation(bytes);
        Ok(region)
    }

    /// Record a deallocation notification. Reclaims nothing.
    pub(crate) fn note_deallocation(&self) {
        self.counters.record_deallocation();
    }

    /// Add one shared reference.
    pub(crate) fn retain(&self) {
        self.refs.set(self.refs.get() + 1);
    }

    /// Drop one shared reference; true when the last one is gone.
    pub(crate) fn release(&self) -> bool {
        let remaining = self.refs.get() - 1;
        self.refs.set(remaining);
        remaining == 0
    }

    /// Snapshot the cumulative counters and chain shape.
    pub(crate) fn stats(&self) -> ArenaStats {
        let blocks = self.blocks.borrow();
        ArenaStats {
            allocations: self.counters.allocations(),
            deallocations: self.counters.deallocations(),
            bytes_allocated: self.counters.bytes_allocated(),
            blocks: blocks.len(),
            bytes_in_use: blocks.iter().map(Block::used).sum(),
        }
    }

    /// Size of the store-hosted control region in bytes.
    fn control_bytes() -> usize {
        round_up(std::mem::size_of::<Self>())
            .expect("the control object is always far below the rounding limit")
    }
}
