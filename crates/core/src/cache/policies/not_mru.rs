//! Not-Most-Recently-Used (NMRU) Replacement Policy.
//!
//! Each set keeps a pointer to its next victim. The pointer only moves when the
//! way it names is touched, so it never rests on the most recently used way.
//! An invalid way is used before the pointer is consulted.

use super::{ReplacementPolicy, Touch, VictimQuery, last_invalid_way};
use crate::cache::line::Line;

/// NMRU Policy state.
#[derive(Debug, Clone)]
pub struct NotMruPolicy {
    /// Next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl NotMruPolicy {
    /// Creates a new NMRU policy instance.
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

impl ReplacementPolicy for NotMruPolicy {
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        last_invalid_way(query.lines).unwrap_or(self.next_way[query.set])
    }

    /// Steps the pointer off `way` if it was pointing at it.
    fn touch(&mut self, set: usize, way: usize, _lines: &mut [Line], _now: u64, _touch: Touch) {
        if self.next_way[set] == way {
            self.next_way[set] = (self.next_way[set] + 1) % self.ways;
        }
    }

    fn reset(&mut self) {
        self.next_way.fill(0);
    }
}
