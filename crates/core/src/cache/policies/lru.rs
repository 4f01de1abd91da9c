//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! Every line carries the logical time of its last access; a touch stamps the
//! current time and the victim is the valid line with the smallest stamp. An
//! invalid way is always used before any valid line is evicted.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `find_victim()`: O(W) where W is the number of ways (associativity)
//! - **Space Complexity:** O(S × W) timestamps, stored in the line metadata
//! - **Hardware Cost:** High - requires full age comparison across the set
//! - **Best Case:** Working sets that fit in the associativity
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::{ReplacementPolicy, Touch, VictimQuery, lru_way};
use crate::cache::line::Line;

/// LRU Policy state.
///
/// Stateless beyond the per-line timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl LruPolicy {
    /// Creates a new LRU policy instance.
    pub const fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Returns the first invalid way, else the way with the oldest timestamp.
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        lru_way(query.lines)
    }

    /// Stamps the accessed way as most recently used.
    fn touch(&mut self, _set: usize, way: usize, lines: &mut [Line], now: u64, _touch: Touch) {
        lines[way].last_access = now;
    }
}
