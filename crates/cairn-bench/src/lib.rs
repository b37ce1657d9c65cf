//! Benchmark profiles and utilities for the cairn arena allocator.
//!
//! Provides deterministic workloads shared by the criterion benches and
//! the example programs:
//!
//! - [`byte_arena`]: a byte-element handle with a given block size
//! - [`mixed_request_sizes`]: a reproducible small/large size mix

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cairn_arena::{ArenaConfig, ArenaHandle};

/// Build a byte-element arena handle with the given default block size.
pub fn byte_arena(block_size: usize) -> ArenaHandle<u8> {
    ArenaHandle::with_config(ArenaConfig::new(block_size))
        .expect("the heap store serves fresh arenas in benchmarks")
}

/// A reproducible mix of request sizes between 1 and 512 bytes.
///
/// Uses a fixed linear congruential sequence so every run, bench or
/// example, sees the identical workload. Roughly one request in sixteen
/// lands in the oversized range relative to a 256-byte block.
pub fn mixed_request_sizes(count: usize) -> Vec<usize> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((state >> 33) % 512 + 1) as usize
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_is_deterministic() {
        assert_eq!(mixed_request_sizes(100), mixed_request_sizes(100));
    }

    #[test]
    fn sizes_stay_in_range() {
        assert!(mixed_request_sizes(1000)
            .iter()
            .all(|&size| (1..=512).contains(&size)));
    }
}
