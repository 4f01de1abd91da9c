//! Random Replacement Policy.
//!
//! This policy evicts a random cache line from the set. Each instance owns a
//! xorshift generator seeded from the configuration, so runs are reproducible
//! and separate caches never perturb each other's sequence.
//!
//! The draw happens on every touch and is parked in a per-set pointer; victim
//! selection just reads the pointer. That keeps `find_victim` free of side
//! effects, so a peek names the same way the next fill will use. Validity is
//! not considered, matching hardware random replacement.

use super::{ReplacementPolicy, Touch, VictimQuery};
use crate::cache::line::Line;
use crate::common::constants::DEFAULT_RANDOM_SEED;

/// Random Policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Next victim for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
    /// Seed the generator restarts from on reset.
    seed: u64,
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    /// * `seed` - Seed of the private stream; zero selects a fixed default.
    pub fn new(sets: usize, ways: usize, seed: u64) -> Self {
        let seed = if seed == 0 { DEFAULT_RANDOM_SEED } else { seed };
        Self {
            next_way: vec![0; sets],
            ways,
            seed,
            state: seed,
        }
    }

    /// Advances the generator and returns a way index.
    fn draw(&mut self) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Returns the way drawn at the last touch of the set.
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        self.next_way[query.set]
    }

    /// Draws the next victim for the set.
    fn touch(&mut self, set: usize, _way: usize, _lines: &mut [Line], _now: u64, _touch: Touch) {
        self.next_way[set] = self.draw();
    }

    fn reset(&mut self) {
        self.next_way.fill(0);
        self.state = self.seed;
    }
}
