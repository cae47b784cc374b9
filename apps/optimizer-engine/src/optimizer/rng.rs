//! Seeded pseudo-random generator for sampled parameter search.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// Xorshift state must never be zero or the sequence collapses.
const ZERO_SEED_FILL: u64 = 0x9E37_79B9_7F4A_7C15;

/// Minimal xorshift64 generator with an explicit, loggable seed.
///
/// Each search invocation owns its own generator, so concurrent callers stay
/// reproducible without sharing state.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    seed: u64,
    state: u64,
}

impl XorShift64 {
    /// Create a generator from an explicit seed, or derive one from the
    /// current time when `None` is given.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let mut hasher = DefaultHasher::new();
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
                .hash(&mut hasher);
            hasher.finish()
        });
        let state = if seed == 0 { ZERO_SEED_FILL } else { seed };
        Self { seed, state }
    }

    /// The seed this generator was built from, for logging and replay.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate the next raw value (xorshift64).
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform index in `0..bound`.
    ///
    /// # Panics
    ///
    /// Panics when `bound` is zero.
    pub const fn next_index(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = XorShift64::new(Some(42));
        let mut b = XorShift64::new(Some(42));

        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = XorShift64::new(Some(1));
        let mut b = XorShift64::new(Some(2));

        let seq_a: Vec<u64> = (0..10).map(|_| a.next_u64()).collect();
        let seq_b: Vec<u64> = (0..10).map(|_| b.next_u64()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_zero_seed_still_produces_values() {
        let mut rng = XorShift64::new(Some(0));
        assert_eq!(rng.seed(), 0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_next_index_within_bound() {
        let mut rng = XorShift64::new(Some(7));
        for _ in 0..1000 {
            assert!(rng.next_index(13) < 13);
        }
    }

    #[test]
    fn test_unseeded_generator_records_its_seed() {
        let rng = XorShift64::new(None);
        let mut replay = XorShift64::new(Some(rng.seed()));
        let mut original = rng.clone();
        assert_eq!(original.next_u64(), replay.next_u64());
    }
}
