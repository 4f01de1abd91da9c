//! Low-Priority-Prefetch Replacement Policy.
//!
//! LRU in which lines brought in by a prefetch and not yet demanded are evicted
//! before any demand line. The victim is recomputed on every touch and parked
//! in a per-set pointer: the first invalid way, else the oldest prefetched
//! line, else the oldest line overall.

use super::{ReplacementPolicy, Touch, VictimQuery, last_invalid_way};
use crate::cache::line::Line;

/// Low-priority-prefetch Policy state.
#[derive(Debug, Clone)]
pub struct LowPrefPolicy {
    /// Next way to be evicted for each set.
    next_way: Vec<usize>,
}

impl LowPrefPolicy {
    /// Creates a new policy instance for `sets` sets.
    pub fn new(sets: usize) -> Self {
        Self {
            next_way: vec![0; sets],
        }
    }

    /// Victim preference order: invalid, oldest prefetched, oldest overall.
    pub fn preferred_victim(lines: &[Line]) -> usize {
        if let Some(way) = lines.iter().position(|line| !line.valid) {
            return way;
        }
        let oldest = |prefetched_only: bool| {
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| !prefetched_only || line.prefetched)
                .min_by_key(|(way, line)| (line.last_access, *way))
                .map(|(way, _)| way)
        };
        oldest(true).or_else(|| oldest(false)).unwrap_or(0)
    }
}

impl ReplacementPolicy for LowPrefPolicy {
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        last_invalid_way(query.lines).unwrap_or(self.next_way[query.set])
    }

    /// Stamps the way and recomputes the set's preferred victim.
    fn touch(&mut self, set: usize, way: usize, lines: &mut [Line], now: u64, _touch: Touch) {
        lines[way].last_access = now;
        self.next_way[set] = Self::preferred_victim(lines);
    }

    fn reset(&mut self) {
        self.next_way.fill(0);
    }
}
