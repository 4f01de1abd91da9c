//! Randomized Invariants.
//!
//! Drives every discipline with random multi-tenant traces and checks the
//! properties that must hold regardless of the replacement decision. The
//! oracle is also checked against a brute-force Belady replay.

use std::collections::HashSet;

use cachesim_core::Cache;
use cachesim_core::common::TenantId;
use cachesim_core::config::{InsertPosition, ReplacementPolicy};
use proptest::prelude::*;

use crate::common::harness::{build, cache, config, line_in_set, replay};

const SETS: usize = 4;
const WAYS: usize = 4;

fn policy() -> impl Strategy<Value = ReplacementPolicy> {
    proptest::sample::select(ReplacementPolicy::ALL.to_vec())
}

fn trace() -> impl Strategy<Value = Vec<(TenantId, usize, u64)>> {
    proptest::collection::vec((0..2u8, 0..SETS, 0..12u64), 1..200)
}

fn two_tenant_cache(policy: ReplacementPolicy) -> Cache<u64> {
    build(&config(policy, SETS, WAYS).with_tenants(2))
}

/// One step of a mixed-operation run.
#[derive(Debug, Clone, Copy)]
enum Op {
    /// Counted probe, then a default insert on a miss.
    Access(TenantId, usize, u64),
    /// Probe that does not update replacement order.
    Uncounted(usize, u64),
    /// Uncounted probe, then an insert at `InsertPosition` on a miss.
    InsertAt(TenantId, usize, u64, InsertPosition),
    /// Invalidate the same line twice.
    Invalidate(usize, u64),
    /// Drop every line and side structure.
    Reset,
}

fn position() -> impl Strategy<Value = InsertPosition> {
    proptest::sample::select(vec![
        InsertPosition::Default,
        InsertPosition::Lru,
        InsertPosition::LowQuarter,
        InsertPosition::Mid,
        InsertPosition::Mru,
        InsertPosition::Srrip,
    ])
}

fn mixed_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        6 => (0..2u8, 0..SETS, 0..12u64).prop_map(|(t, s, n)| Op::Access(t, s, n)),
        2 => (0..SETS, 0..12u64).prop_map(|(s, n)| Op::Uncounted(s, n)),
        3 => (0..2u8, 0..SETS, 0..12u64, position())
            .prop_map(|(t, s, n, p)| Op::InsertAt(t, s, n, p)),
        2 => (0..SETS, 0..12u64).prop_map(|(s, n)| Op::Invalidate(s, n)),
        1 => Just(Op::Reset),
    ];
    proptest::collection::vec(op, 1..200)
}

/// Misses of an optimal replay that evicts the line reused furthest ahead.
fn belady_misses(trace: &[u64], ways: usize) -> usize {
    let mut resident: Vec<u64> = Vec::with_capacity(ways);
    let mut misses = 0;
    for (idx, &addr) in trace.iter().enumerate() {
        if resident.contains(&addr) {
            continue;
        }
        misses += 1;
        if resident.len() == ways {
            let next_use = |line: u64| {
                trace[idx + 1..]
                    .iter()
                    .position(|&later| later == line)
                    .unwrap_or(usize::MAX)
            };
            let furthest = (0..resident.len())
                .max_by_key(|&way| next_use(resident[way]))
                .unwrap();
            let _ = resident.swap_remove(furthest);
        }
        resident.push(addr);
    }
    misses
}

/// Checks the per-set invariants every operation must preserve.
fn check_sets(cache: &Cache<u64>, policy: ReplacementPolicy) -> Result<(), TestCaseError> {
    for set in 0..SETS {
        let valid: Vec<u64> = cache.lines(set).iter().filter(|l| l.valid).map(|l| l.base).collect();
        let unique: HashSet<u64> = valid.iter().copied().collect();
        prop_assert_eq!(valid.len(), unique.len(), "{}: duplicate line in set {}", policy, set);
        prop_assert!(cache.valid_ways(set) <= WAYS, "{}: set {} over capacity", policy, set);
        if policy == ReplacementPolicy::Ideal {
            prop_assert_eq!(cache.sure_count(set), Some(cache.valid_ways(set)));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A missed line is present right after its insert, and no set ever
    /// holds the same line twice.
    #[test]
    fn inserted_line_is_present(policy in policy(), ops in trace()) {
        let mut cache = two_tenant_cache(policy);
        for (tenant, set, n) in ops {
            let addr = line_in_set(SETS, set, n);
            if !cache.probe(addr, true).is_hit() {
                let _ = cache.insert(tenant, addr, false);
                prop_assert!(cache.probe(addr, false).is_hit(), "{policy}: {addr:#x} lost");
            }
            let lines = cache.lines(set);
            let valid: Vec<u64> = lines.iter().filter(|l| l.valid).map(|l| l.base).collect();
            let unique: HashSet<u64> = valid.iter().copied().collect();
            prop_assert_eq!(valid.len(), unique.len());
            prop_assert!(valid.len() <= WAYS);
        }
        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, stats.probes);
    }

    /// The peeked victim is exactly the line the next insert evicts.
    #[test]
    fn peek_matches_insert(policy in policy(), ops in trace()) {
        prop_assume!(policy.has_direct_victim());
        let mut cache = two_tenant_cache(policy);
        for (tenant, set, n) in ops {
            let addr = line_in_set(SETS, set, n);
            if cache.probe(addr, true).is_hit() {
                continue;
            }
            let peek = cache.peek_victim(tenant, addr);
            let expected = peek.valid.then_some(peek.line_addr);
            let victim = cache.insert(tenant, addr, false).victim;
            prop_assert_eq!(victim, expected, "{}", policy);
        }
    }

    /// Under the oracle the sure count always equals the valid ways, and no
    /// insert reports an eviction.
    #[test]
    fn oracle_sure_count_matches_valid_ways(ops in trace()) {
        let mut cache = two_tenant_cache(ReplacementPolicy::Ideal);
        for (tenant, set, n) in ops {
            let addr = line_in_set(SETS, set, n);
            if !cache.probe(addr, true).is_hit() {
                prop_assert_eq!(cache.insert(tenant, addr, false).victim, None);
            }
            prop_assert_eq!(cache.sure_count(set), Some(cache.valid_ways(set)));
        }
        prop_assert_eq!(cache.stats().evictions, 0);
    }

    /// Probes, positioned inserts, double invalidations, and resets never
    /// overfill a set, never duplicate a line, and keep the oracle's sure
    /// count equal to its valid ways.
    #[test]
    fn mixed_operations_keep_set_invariants(policy in policy(), ops in mixed_ops()) {
        let mut cache = two_tenant_cache(policy);
        for op in ops {
            match op {
                Op::Access(tenant, set, n) => {
                    let addr = line_in_set(SETS, set, n);
                    if !cache.probe(addr, true).is_hit() {
                        let _ = cache.insert(tenant, addr, false);
                    }
                }
                Op::Uncounted(set, n) => {
                    let _ = cache.probe(line_in_set(SETS, set, n), false);
                }
                Op::InsertAt(tenant, set, n, position) => {
                    let addr = line_in_set(SETS, set, n);
                    if !cache.probe(addr, false).is_hit() {
                        let _ = cache.insert_at(tenant, addr, position, false);
                        prop_assert!(cache.probe(addr, false).is_hit(), "{policy}: {addr:#x} lost");
                    }
                }
                Op::Invalidate(set, n) => {
                    let addr = line_in_set(SETS, set, n);
                    cache.invalidate(addr);
                    let valid = cache.valid_ways(set);
                    let invalidations = cache.stats().invalidations;
                    cache.invalidate(addr);
                    prop_assert_eq!(cache.valid_ways(set), valid);
                    prop_assert_eq!(cache.stats().invalidations, invalidations);
                    prop_assert!(
                        !cache.probe(addr, false).is_hit(),
                        "{policy}: {addr:#x} survived"
                    );
                }
                Op::Reset => {
                    cache.reset();
                    for set in 0..SETS {
                        prop_assert_eq!(cache.valid_ways(set), 0);
                    }
                }
            }
            check_sets(&cache, policy)?;
        }
    }

    /// The oracle misses exactly as often as a brute-force Belady replay,
    /// and never more often than true LRU.
    #[test]
    fn oracle_matches_belady(
        ways in 2..=4usize,
        lines in proptest::collection::vec(0..9u64, 5..45),
    ) {
        let trace: Vec<u64> = lines.iter().map(|&n| line_in_set(1, 0, n)).collect();
        let oracle = replay(&mut cache(ReplacementPolicy::Ideal, 1, ways), &trace).misses;
        let lru = replay(&mut cache(ReplacementPolicy::TrueLru, 1, ways), &trace).misses;
        prop_assert_eq!(oracle, belady_misses(&trace, ways));
        prop_assert!(oracle <= lru, "oracle {} > lru {}", oracle, lru);
    }

    /// A tenant below its quota in a full set always gains a way on insert.
    #[test]
    fn partition_under_quota_tenant_gains_way(
        ops in proptest::collection::vec((0..2u8, 0..16u64), 40..200),
    ) {
        let mut cache = two_tenant_cache(ReplacementPolicy::Partition);
        for (tenant, n) in ops {
            let addr = line_in_set(SETS, 0, n + 16 * u64::from(tenant));
            if !cache.probe(addr, true).is_hit() {
                let before = cache.occupancy(0, tenant);
                let full = cache.valid_ways(0) == WAYS;
                let _ = cache.insert(tenant, addr, false);
                if full && before < cache.partition_quota(tenant) {
                    prop_assert_eq!(cache.occupancy(0, tenant), before + 1);
                }
            }
        }
    }
}
