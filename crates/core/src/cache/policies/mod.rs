//! Cache Replacement Disciplines.
//!
//! Implements the algorithms that select victim lines in set-associative caches.
//!
//! # Policies
//!
//! - `LruPolicy`: True least-recently-used (also drives the shadow-ideal and
//!   ideal-storage primary arrays).
//! - `MruPolicy`: Most-recently-used, evicting prefetched lines first.
//! - `RandomPolicy`: Random selection from a private seeded stream.
//! - `RoundRobinPolicy`: Rotating pointer advanced on every touch.
//! - `NotMruPolicy`: Rotating pointer that steps off the most recently used way.
//! - `LowPrefPolicy`: LRU restricted to prefetched lines first.
//! - `PartitionPolicy`: Per-tenant way quotas with fair over-occupancy draining.
//! - `SrripPolicy`: Static re-reference interval prediction.
//! - `IdealPolicy`: Oracle replacement; victims come from the unsure lists instead.

/// Oracle (Belady) discipline marker.
pub mod ideal;

/// Least Recently Used replacement policy.
pub mod lru;

/// Most Recently Used replacement policy.
pub mod mru;

/// Low priority for prefetched lines.
pub mod low_pref;

/// Not-most-recently-used replacement policy.
pub mod not_mru;

/// Fair way partitioning between tenants.
pub mod partition;

/// Random replacement policy.
pub mod random;

/// Round-robin replacement policy.
pub mod round_robin;

/// Static re-reference interval prediction.
pub mod srrip;

pub use ideal::IdealPolicy;
pub use lru::LruPolicy;
pub use low_pref::LowPrefPolicy;
pub use mru::MruPolicy;
pub use not_mru::NotMruPolicy;
pub use partition::PartitionPolicy;
pub use random::RandomPolicy;
pub use round_robin::RoundRobinPolicy;
pub use srrip::SrripPolicy;

use super::line::Line;
use crate::common::{CacheError, TenantId};
use crate::config::{CacheConfig, ReplacementPolicy as PolicyType};

/// Why a discipline's state is being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    /// A demand access hit the way.
    Hit,
    /// A line was just filled into the way with the default insertion position.
    Fill,
}

/// Inputs to a victim search in one set.
#[derive(Debug, Clone, Copy)]
pub struct VictimQuery<'a> {
    /// Set being searched.
    pub set: usize,
    /// Tenant requesting the fill.
    pub tenant: TenantId,
    /// Metadata of every way in the set.
    pub lines: &'a [Line],
}

/// Trait for cache replacement disciplines.
///
/// Defines the interface for selecting victim lines and updating usage state.
pub trait ReplacementPolicy: Send + Sync + std::fmt::Debug {
    /// Selects the way to evict from `query.set`.
    ///
    /// Must not change any state: `Cache::peek_victim` relies on the next fill
    /// choosing the same way.
    fn find_victim(&self, query: VictimQuery<'_>) -> usize;

    /// Updates the discipline after a hit or a default-position fill.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    /// * `lines` - Metadata of every way in the set.
    /// * `now` - Current logical time of the cache.
    /// * `touch` - Whether this is a hit or a fill.
    fn touch(&mut self, set: usize, way: usize, lines: &mut [Line], now: u64, touch: Touch);

    /// Runs right before `way` is overwritten by a fill.
    fn before_fill(&mut self, _set: usize, _way: usize, _lines: &mut [Line]) {}

    /// Returns every per-set pointer to its initial state.
    fn reset(&mut self) {}

    /// Partition quotas, when the discipline is partition-based.
    fn as_partition(&self) -> Option<&PartitionPolicy> {
        None
    }

    /// Mutable partition quotas, when the discipline is partition-based.
    fn as_partition_mut(&mut self) -> Option<&mut PartitionPolicy> {
        None
    }
}

/// Way index of the least recently used line in `lines`.
///
/// The first invalid way wins; otherwise the way with the smallest timestamp,
/// the lowest index breaking ties.
#[inline]
pub fn lru_way(lines: &[Line]) -> usize {
    let mut lru = 0;
    let mut lru_time = u64::MAX;
    for (way, line) in lines.iter().enumerate() {
        if !line.valid {
            return way;
        }
        if line.last_access < lru_time {
            lru = way;
            lru_time = line.last_access;
        }
    }
    lru
}

/// Last invalid way in `lines`, used by the pointer-based disciplines.
#[inline]
pub fn last_invalid_way(lines: &[Line]) -> Option<usize> {
    lines.iter().rposition(|line| !line.valid)
}

/// Builds the discipline selected by `config`.
///
/// # Errors
///
/// Returns an error if the partition quotas or the RRPV width are invalid.
pub fn build(config: &CacheConfig, sets: usize) -> Result<Box<dyn ReplacementPolicy>, CacheError> {
    let ways = config.ways;
    let policy: Box<dyn ReplacementPolicy> = match config.policy {
        PolicyType::TrueLru | PolicyType::ShadowIdeal | PolicyType::IdealStorage => {
            Box::new(LruPolicy::new())
        }
        PolicyType::Mru => Box::new(MruPolicy::new()),
        PolicyType::Random => Box::new(RandomPolicy::new(sets, ways, config.seed)),
        PolicyType::NotMru => Box::new(NotMruPolicy::new(sets, ways)),
        PolicyType::RoundRobin => Box::new(RoundRobinPolicy::new(sets, ways)),
        PolicyType::LowPref => Box::new(LowPrefPolicy::new(sets)),
        PolicyType::Ideal => Box::new(IdealPolicy::new(&config.name)),
        PolicyType::Partition => Box::new(PartitionPolicy::from_config(config)?),
        PolicyType::Srrip => Box::new(SrripPolicy::from_config(config)?),
    };
    Ok(policy)
}
