//! Most-Recently-Used Tests.
//!
//! The newest line is evicted first, except that undemanded prefetches go
//! before any demand line.

use cachesim_core::config::ReplacementPolicy;
use pretty_assertions::assert_eq;

use crate::common::harness::{cache, cyclic, replay};

const A: u64 = 0x000;
const B: u64 = 0x040;
const C: u64 = 0x080;
const D: u64 = 0x0C0;
const E: u64 = 0x100;
const F: u64 = 0x140;
const G: u64 = 0x180;

/// The last demand hit is the next victim.
#[test]
fn last_hit_is_evicted() {
    let mut cache = cache(ReplacementPolicy::Mru, 1, 4);
    for addr in [A, B, C, D] {
        let _ = cache.insert(0, addr, false);
    }
    assert!(cache.probe(B, true).is_hit());
    assert_eq!(cache.peek_victim(0, E).line_addr, B);
    assert_eq!(cache.insert(0, E, false).victim, Some(B));

    // The fill itself is now the newest line.
    assert_eq!(cache.insert(0, F, false).victim, Some(E));
}

/// A prefetched line is evicted before the newer demand lines.
#[test]
fn prefetched_line_goes_first() {
    let mut cache = cache(ReplacementPolicy::Mru, 1, 4);
    for addr in [A, B, C, D] {
        let _ = cache.insert(0, addr, false);
    }
    assert_eq!(cache.insert(0, E, true).victim, Some(D));
    assert!(cache.probe(A, true).is_hit());
    assert_eq!(cache.insert(0, F, false).victim, Some(E));
    assert_eq!(cache.insert(0, G, false).victim, Some(F));
}

/// A loop one line larger than the set keeps most of its lines under MRU.
#[test]
fn cyclic_loop_beats_lru() {
    let trace = cyclic(1, 5, 3);

    let mut mru = cache(ReplacementPolicy::Mru, 1, 4);
    assert_eq!(replay(&mut mru, &trace).misses, 7);

    let mut lru = cache(ReplacementPolicy::TrueLru, 1, 4);
    assert_eq!(replay(&mut lru, &trace).misses, 15);
}
