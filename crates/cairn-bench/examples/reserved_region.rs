//! Arena allocation from one pre-reserved region.
//!
//! The arena, control state included, draws from a fixed 1 MiB
//! reservation. Individual deallocations never return space; the whole
//! reservation is released when the store drops. A request the
//! reservation can never serve fails cleanly instead of growing forever.

use cairn_arena::{ArenaConfig, ArenaHandle};
use cairn_core::{ReservedStore, StoreError};

fn main() -> Result<(), StoreError> {
    let store = ReservedStore::new(1 << 20)?;
    let values: ArenaHandle<u64, ReservedStore> =
        ArenaHandle::with_store(ArenaConfig::new(64 * 1024), store)?;

    for i in 0..1000u64 {
        let slot = values.allocate(1)?;
        // SAFETY: `slot` was just allocated with room for one value and
        // holds nothing yet.
        unsafe { values.construct(slot, i * i) };
    }
    println!("after 1000 values: {:?}", values.stats());

    match values.allocate(1 << 22) {
        Err(err) => println!("oversized request refused: {err}"),
        Ok(_) => println!("unexpected: the reservation is only 1 MiB"),
    }

    // The refusal left the arena fully usable.
    values.allocate(100)?;
    println!("after the refusal: {:?}", values.stats());
    Ok(())
}
