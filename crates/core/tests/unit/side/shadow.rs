//! Shadow-Ideal Replacement Tests.
//!
//! Evicted lines move to a shadow array. A later miss that finds its line
//! there compares recency with the primary LRU line and either swaps the line
//! back in (a hit) or drops it (a miss).

use cachesim_core::config::ReplacementPolicy;
use pretty_assertions::assert_eq;

use crate::common::harness::{build, cache, config, replay};

const A: u64 = 0x000;
const B: u64 = 0x040;
const C: u64 = 0x080;
const D: u64 = 0x0C0;

/// a, b, c in two ways: a is shadowed, its re-reference is a hit with its
/// payload, and b then loses the recency comparison.
#[test]
fn promote_then_discard() {
    let mut cache = cache(ReplacementPolicy::ShadowIdeal, 1, 2);
    let _ = cache.probe(A, true);
    *cache.insert(0, A, false).data = 10;
    let _ = cache.probe(B, true);
    *cache.insert(0, B, false).data = 11;
    let _ = cache.probe(C, true);
    let ins = cache.insert(0, C, false);
    assert_eq!(ins.victim, Some(A));
    assert_eq!(*ins.data, 0);
    assert!(cache.shadow_holds(A));

    assert_eq!(cache.probe(A, true).data.copied(), Some(10));
    assert!(cache.shadow_holds(B));
    assert!(!cache.shadow_holds(A));
    assert_eq!(cache.stats().shadow_promotions, 1);

    assert!(!cache.probe(B, true).is_hit());
    assert!(!cache.shadow_holds(B));
    assert_eq!(cache.stats().shadow_discards, 1);
    assert_eq!(cache.stats().hits, 1);
}

/// A shadow line always beats an empty primary way.
#[test]
fn promotes_into_free_way() {
    let mut cache = cache(ReplacementPolicy::ShadowIdeal, 1, 2);
    let _ = replay(&mut cache, &[A, B, C]);
    cache.invalidate(B);
    assert!(cache.probe(A, true).is_hit());
    assert_eq!(cache.valid_ways(0), 2);
    assert!(!cache.shadow_holds(B));
}

/// The shadow array keeps its own LRU order and capacity.
#[test]
fn shadow_capacity() {
    let mut config = config(ReplacementPolicy::ShadowIdeal, 1, 2);
    config.shadow_ways = Some(1);
    let mut cache = build(&config);
    let _ = replay(&mut cache, &[A, B, C, D]);
    assert!(cache.shadow_holds(B));
    assert!(!cache.shadow_holds(A));
    assert!(!cache.probe(A, true).is_hit());
}

/// Invalidation reaches shadow copies.
#[test]
fn invalidate_drops_shadow_copy() {
    let mut cache = cache(ReplacementPolicy::ShadowIdeal, 1, 2);
    let _ = replay(&mut cache, &[A, B, C]);
    cache.invalidate(A);
    assert!(!cache.shadow_holds(A));
    assert_eq!(cache.stats().invalidations, 1);
    assert!(!cache.probe(A, true).is_hit());
}

/// Shadow swaps recover hits that true LRU misses.
#[test]
fn beats_lru_on_cyclic_trace() {
    let trace = [A, B, C, A, B, C, A, B, C];
    let mut shadow = cache(ReplacementPolicy::ShadowIdeal, 1, 2);
    let mut lru = cache(ReplacementPolicy::TrueLru, 1, 2);
    let shadow_misses = replay(&mut shadow, &trace).misses;
    let lru_misses = replay(&mut lru, &trace).misses;
    assert_eq!(lru_misses, 9);
    assert!(shadow_misses < lru_misses);
}
