//! Most Recently Used (MRU) Replacement Policy.
//!
//! This policy evicts the cache line that was accessed most recently.
//! While counter-intuitive for standard workloads, MRU is optimal for
//! cyclic access patterns (loops) where the dataset is larger than the cache.
//! In such cases, the most recently used item is the least likely to be
//! needed again in the immediate future.
//!
//! Lines brought in by a prefetch and not yet demanded go first, newest
//! insert first. An invalid way is always used before any valid line is
//! evicted.

use std::cmp::Reverse;

use super::{ReplacementPolicy, Touch, VictimQuery};
use crate::cache::line::Line;

/// MRU Policy state.
///
/// Stateless beyond the per-line timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct MruPolicy;

impl MruPolicy {
    /// Creates a new MRU policy instance.
    pub const fn new() -> Self {
        Self
    }

    /// Victim preference order: invalid, newest prefetched, newest overall.
    ///
    /// The lowest way index breaks ties.
    pub fn preferred_victim(lines: &[Line]) -> usize {
        if let Some(way) = lines.iter().position(|line| !line.valid) {
            return way;
        }
        let prefetched = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.prefetched)
            .max_by_key(|(way, line)| (line.inserted, Reverse(*way)))
            .map(|(way, _)| way);
        prefetched.unwrap_or_else(|| {
            lines
                .iter()
                .enumerate()
                .max_by_key(|(way, line)| (line.last_access, Reverse(*way)))
                .map_or(0, |(way, _)| way)
        })
    }
}

impl ReplacementPolicy for MruPolicy {
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        Self::preferred_victim(query.lines)
    }

    /// Stamps the accessed way as most recently used.
    fn touch(&mut self, _set: usize, way: usize, lines: &mut [Line], now: u64, _touch: Touch) {
        lines[way].last_access = now;
    }
}
