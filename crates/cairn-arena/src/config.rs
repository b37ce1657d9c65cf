//! Arena configuration parameters.

/// Configuration for one arena.
///
/// Controls the default block size applied whenever the arena grows to
/// serve a run of ordinary-sized requests. Values are clamped at arena
/// construction; the configuration itself is immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Default size of each backing block in bytes.
    ///
    /// Default: 10_240. Values below [`ArenaConfig::MIN_BLOCK_SIZE`] are
    /// raised to that floor when the arena is constructed; a tiny default
    /// would thrash the backing store with one block per request.
    pub block_size: usize,
}

impl ArenaConfig {
    /// Default block size in bytes.
    pub const DEFAULT_BLOCK_SIZE: usize = 10_240;

    /// Smallest permitted block size in bytes.
    pub const MIN_BLOCK_SIZE: usize = 256;

    /// Create a config with the given default block size.
    ///
    /// Sizes below [`ArenaConfig::MIN_BLOCK_SIZE`] are raised to the floor.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(Self::MIN_BLOCK_SIZE),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_block_size() {
        assert_eq!(ArenaConfig::default().block_size, 10_240);
    }

    #[test]
    fn tiny_sizes_are_raised_to_the_floor() {
        assert_eq!(ArenaConfig::new(1).block_size, 256);
        assert_eq!(ArenaConfig::new(0).block_size, 256);
    }

    #[test]
    fn sizes_at_or_above_the_floor_are_kept() {
        assert_eq!(ArenaConfig::new(256).block_size, 256);
        assert_eq!(ArenaConfig::new(4096).block_size, 4096);
    }
}
