//! Round-Robin Replacement Policy.
//!
//! This policy evicts ways in a fixed rotation, regardless of how recently
//! they were accessed. Each set keeps one pointer that advances on every touch
//! (hit or fill). An invalid way is used before the pointer is consulted.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `find_victim()`: O(W) for the invalid-way scan
//! - **Space Complexity:** O(S) where S is the number of sets
//! - **Hardware Cost:** Minimal - single counter per set
//! - **Best Case:** Streaming accesses where all lines have equal importance
//! - **Worst Case:** Workloads with strong temporal locality

use super::{ReplacementPolicy, Touch, VictimQuery, last_invalid_way};
use crate::cache::line::Line;

/// Round-Robin Policy state.
#[derive(Debug, Clone)]
pub struct RoundRobinPolicy {
    /// Tracks the next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl RoundRobinPolicy {
    /// Creates a new Round-Robin policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for RoundRobinPolicy {
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        last_invalid_way(query.lines).unwrap_or(self.next_way[query.set])
    }

    /// Advances the set's pointer.
    fn touch(&mut self, set: usize, _way: usize, _lines: &mut [Line], _now: u64, _touch: Touch) {
        self.next_way[set] = (self.next_way[set] + 1) % self.ways;
    }

    fn reset(&mut self) {
        self.next_way.fill(0);
    }
}
