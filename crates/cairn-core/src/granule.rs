//! The allocation granule and size rounding.
//!
//! Every size handed to a [`BackingStore`](crate::BackingStore) and every
//! bump offset inside a block is a multiple of [`GRANULE`], so any scalar
//! value stored at a returned address is naturally aligned.

/// The allocation granule in bytes.
///
/// The largest natural alignment among the platform's scalar types
/// (pointer, `u64`, `f64`, `u128`). Always a power of two; 16 on the
/// common 64-bit targets. Element types with alignment above the granule
/// cannot be served by the arena and are rejected at compile time.
pub const GRANULE: usize = max_scalar_align();

const fn max_scalar_align() -> usize {
    let mut granule = std::mem::align_of::<*const ()>();
    if std::mem::align_of::<u64>() > granule {
        granule = std::mem::align_of::<u64>();
    }
    if std::mem::align_of::<f64>() > granule {
        granule = std::mem::align_of::<f64>();
    }
    if std::mem::align_of::<u128>() > granule {
        granule = std::mem::align_of::<u128>();
    }
    granule
}

// Rounding below relies on the mask trick, which needs a power of two.
const _: () = assert!(GRANULE.is_power_of_two());

/// Round `bytes` up to the next multiple of [`GRANULE`].
///
/// Returns `None` if the rounded size is not representable in `usize`.
/// Zero rounds to zero.
pub const fn round_up(bytes: usize) -> Option<usize> {
    match bytes.checked_add(GRANULE - 1) {
        Some(padded) => Some(padded & !(GRANULE - 1)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granule_covers_scalar_alignments() {
        assert!(GRANULE >= std::mem::align_of::<*const ()>());
        assert!(GRANULE >= std::mem::align_of::<u64>());
        assert!(GRANULE >= std::mem::align_of::<f64>());
        assert!(GRANULE >= std::mem::align_of::<u128>());
    }

    #[test]
    fn zero_rounds_to_zero() {
        assert_eq!(round_up(0), Some(0));
    }

    #[test]
    fn exact_multiples_are_unchanged() {
        assert_eq!(round_up(GRANULE), Some(GRANULE));
        assert_eq!(round_up(GRANULE * 7), Some(GRANULE * 7));
    }

    #[test]
    fn one_byte_rounds_to_one_granule() {
        assert_eq!(round_up(1), Some(GRANULE));
    }

    #[test]
    fn near_max_overflows_to_none() {
        assert_eq!(round_up(usize::MAX), None);
        assert_eq!(round_up(usize::MAX - GRANULE + 2), None);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rounded_size_is_aligned_and_sufficient(bytes in 0usize..usize::MAX / 2) {
                let rounded = round_up(bytes).unwrap();
                prop_assert_eq!(rounded % GRANULE, 0);
                prop_assert!(rounded >= bytes);
                prop_assert!(rounded < bytes + GRANULE);
            }
        }
    }
}
