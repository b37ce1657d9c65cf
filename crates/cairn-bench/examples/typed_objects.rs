//! Placement construction and explicit finalization through a handle.
//!
//! Allocation and object lifetime are decoupled: the arena reserves
//! storage, the caller constructs and destroys values in place, and all
//! storage comes back in one pass when the last handle drops.

use cairn_arena::ArenaHandle;
use cairn_core::StoreError;

#[derive(Debug)]
struct Reading {
    sensor: u32,
    label: String,
    value: f64,
}

fn main() -> Result<(), StoreError> {
    let readings: ArenaHandle<Reading> = ArenaHandle::new()?;

    let slot = readings.allocate(1)?;
    // SAFETY: `slot` was just allocated with room for one `Reading` and
    // holds nothing yet.
    unsafe {
        readings.construct(
            slot,
            Reading {
                sensor: 7,
                label: String::from("intake temperature"),
                value: 21.5,
            },
        );
        println!("constructed in place: {:?}", slot.as_ref());
        // Finalizes the String; the slot's storage stays reserved.
        readings.destroy(slot);
    }

    // The same region backs a second element type.
    let labels = readings.rebind::<u8>();
    let buf = labels.allocate(16)?;
    labels.deallocate(buf, 16);

    println!("final stats: {:?}", readings.stats());
    Ok(())
}
