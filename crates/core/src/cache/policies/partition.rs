//! Fair Way-Partitioning Replacement Policy.
//!
//! Each tenant is allocated a quota of ways per set; quotas always sum to the
//! associativity. A tenant may hold more ways than its quota while others leave
//! theirs unused. When a set is full, the policy decides whose least recently
//! used line to evict:
//!
//! 1. **Under quota:** A requester below its quota takes a way from the tenant
//!    that over-occupies the most.
//! 2. **Clear imbalance:** The worst over-occupier is evicted when its excess
//!    exceeds the requester's by more than one.
//! 3. **Tie rotation:** When the excesses differ by exactly one, a rotation keyed
//!    on the set index decides, so over-occupancy is spread evenly across sets
//!    instead of always favoring the same tenant.
//! 4. **Otherwise:** The requester replaces its own least recently used line.
//!
//! Recency inside a tenant is tracked with plain LRU timestamps.

use super::{ReplacementPolicy, Touch, VictimQuery};
use crate::cache::line::Line;
use crate::common::{CacheError, TenantId};
use crate::config::CacheConfig;

/// Partition Policy state.
#[derive(Debug, Clone)]
pub struct PartitionPolicy {
    /// Name of the owning cache, used in contract-violation messages.
    name: String,
    /// Ways allocated to each tenant.
    quotas: Vec<usize>,
    /// Associativity of the cache.
    ways: usize,
}

/// Returns `true` if the set-keyed rotation favors evicting `other` over `requester`.
///
/// The rotation compares `(tenant + set) mod tenants`; the tenant with the
/// larger rotated index yields a way.
pub fn rotation_favors_other(requester: usize, other: usize, set: usize, tenants: usize) -> bool {
    (requester + set) % tenants > (other + set) % tenants
}

impl PartitionPolicy {
    /// Creates the policy from a cache configuration.
    ///
    /// Uses `config.partition` when present; otherwise splits the ways evenly,
    /// giving the remainder to the lowest-numbered tenants.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::PartitionQuota`] if a tenant gets no way or the
    /// quotas do not sum to the associativity.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let tenants = config.tenants.max(1);
        let quotas = config.partition.clone().unwrap_or_else(|| {
            let base = config.ways / tenants;
            let extra = config.ways % tenants;
            (0..tenants).map(|t| base + usize::from(t < extra)).collect()
        });
        if quotas.len() != tenants
            || quotas.iter().any(|&q| q == 0)
            || quotas.iter().sum::<usize>() != config.ways
        {
            return Err(CacheError::PartitionQuota {
                name: config.name.clone(),
                quotas,
                ways: config.ways,
            });
        }
        Ok(Self {
            name: config.name.clone(),
            quotas,
            ways: config.ways,
        })
    }

    /// Number of tenants sharing the cache.
    pub fn tenants(&self) -> usize {
        self.quotas.len()
    }

    /// Ways currently allocated to `tenant`.
    ///
    /// # Panics
    ///
    /// Panics if `tenant` is out of range.
    pub fn quota(&self, tenant: TenantId) -> usize {
        self.quotas[usize::from(tenant)]
    }

    /// All quotas, indexed by tenant.
    pub fn quotas(&self) -> &[usize] {
        &self.quotas
    }

    /// Changes the allocation of `tenant`.
    ///
    /// The quotas may be temporarily inconsistent while a caller rebalances
    /// several tenants; they are checked at the next victim search.
    ///
    /// # Panics
    ///
    /// Panics if `tenant` is out of range.
    pub fn set_quota(&mut self, tenant: TenantId, ways: usize) {
        self.quotas[usize::from(tenant)] = ways;
    }

    fn check_quotas(&self) {
        assert!(
            self.quotas.iter().all(|&q| q > 0),
            "{}: every tenant needs at least one way, quotas {:?}",
            self.name,
            self.quotas
        );
        assert_eq!(
            self.quotas.iter().sum::<usize>(),
            self.ways,
            "{}: quotas {:?} do not cover the associativity",
            self.name,
            self.quotas
        );
    }
}

impl ReplacementPolicy for PartitionPolicy {
    /// Picks the way to evict for `query.tenant`.
    ///
    /// # Panics
    ///
    /// Panics if the quotas are inconsistent, or if the set holds a tenant id
    /// outside the configured range.
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        self.check_quotas();
        if let Some(way) = query.lines.iter().position(|line| !line.valid) {
            return way;
        }

        let tenants = self.tenants();
        let mut occupied = vec![0usize; tenants];
        let mut lru = vec![(u64::MAX, 0usize); tenants];
        for (way, line) in query.lines.iter().enumerate() {
            let owner = usize::from(line.tenant);
            occupied[owner] += 1;
            if line.last_access < lru[owner].0 {
                lru[owner] = (line.last_access, way);
            }
        }

        let mut max_extra = 0isize;
        let mut worst: Option<usize> = None;
        for tenant in 0..tenants {
            let extra = occupied[tenant] as isize - self.quotas[tenant] as isize;
            if extra > max_extra {
                max_extra = extra;
                worst = Some(tenant);
            }
        }

        let requester = usize::from(query.tenant);
        let own_extra = occupied[requester] as isize - self.quotas[requester] as isize;
        let take_from_other = own_extra < 0
            || max_extra > own_extra + 1
            || (max_extra > own_extra
                && worst.is_some_and(|w| rotation_favors_other(requester, w, query.set, tenants)));

        match worst {
            Some(other) if take_from_other => lru[other].1,
            _ => {
                assert!(
                    !take_from_other,
                    "{}: full set {} has no over-occupying tenant",
                    self.name, query.set
                );
                lru[requester].1
            }
        }
    }

    fn touch(&mut self, _set: usize, way: usize, lines: &mut [Line], now: u64, _touch: Touch) {
        lines[way].last_access = now;
    }

    fn as_partition(&self) -> Option<&PartitionPolicy> {
        Some(self)
    }

    fn as_partition_mut(&mut self) -> Option<&mut PartitionPolicy> {
        Some(self)
    }
}
