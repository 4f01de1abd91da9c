//! Low-Priority-Prefetch Tests.
//!
//! Prefetched lines that were never demanded are evicted before any demand
//! line, oldest first; without such lines the discipline is plain LRU.

use cachesim_core::config::ReplacementPolicy;
use pretty_assertions::assert_eq;

use crate::common::harness::cache;

const A: u64 = 0x000;
const B: u64 = 0x040;
const C: u64 = 0x080;
const D: u64 = 0x0C0;
const E: u64 = 0x100;
const F: u64 = 0x140;
const G: u64 = 0x180;

/// Prefetched lines go first, then the oldest demand line.
#[test]
fn prefetched_lines_evicted_first() {
    let mut cache = cache(ReplacementPolicy::LowPref, 1, 4);
    let _ = cache.insert(0, A, false);
    let _ = cache.insert(0, B, true);
    let _ = cache.insert(0, C, false);
    let _ = cache.insert(0, D, true);

    assert_eq!(cache.peek_victim(0, E).line_addr, B);
    assert_eq!(cache.insert(0, E, false).victim, Some(B));
    assert_eq!(cache.insert(0, F, false).victim, Some(D));
    assert_eq!(cache.insert(0, G, false).victim, Some(A));
}

/// A demand hit clears the prefetched flag, leaving the global LRU as victim.
#[test]
fn demand_hit_promotes_prefetched_line() {
    let mut cache = cache(ReplacementPolicy::LowPref, 1, 4);
    let _ = cache.insert(0, A, false);
    let _ = cache.insert(0, B, true);
    let _ = cache.insert(0, C, false);
    let _ = cache.insert(0, D, false);

    assert!(cache.probe(B, true).is_hit());
    assert!(cache.lines(0).iter().all(|line| !line.prefetched));
    assert_eq!(cache.insert(0, E, false).victim, Some(A));
}

/// An uncounted probe leaves the prefetched line first in line.
#[test]
fn uncounted_probe_keeps_prefetch_priority() {
    let mut cache = cache(ReplacementPolicy::LowPref, 1, 4);
    let _ = cache.insert(0, A, false);
    let _ = cache.insert(0, B, true);
    let _ = cache.insert(0, C, false);
    let _ = cache.insert(0, D, false);

    assert!(cache.probe(B, false).is_hit());
    assert_eq!(cache.insert(0, E, false).victim, Some(B));
}
