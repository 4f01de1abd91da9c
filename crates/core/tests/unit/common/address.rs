//! Address Decomposition Tests.
//!
//! Verifies the set/tag/line-base split and its consistency with probe and
//! insert, over fixed cases and random addresses.

use cachesim_core::config::ReplacementPolicy;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::harness::{LINE, cache};

// ══════════════════════════════════════════════════════════
// 1. Fixed Cases
// ══════════════════════════════════════════════════════════

/// 8 sets of 64-byte lines: bits 6..9 select the set.
#[rstest]
#[case(0x0000, 0, 0x0000)]
#[case(0x0040, 1, 0x0040)]
#[case(0x01FF, 7, 0x01C0)]
#[case(0x0200, 0, 0x0200)]
#[case(0x1234_5678, 1, 0x1234_5640)]
fn decomposition_cases(#[case] addr: u64, #[case] set: usize, #[case] line_addr: u64) {
    let cache = cache(ReplacementPolicy::TrueLru, 8, 4);
    let d = cache.index(addr);
    assert_eq!(d.set, set);
    assert_eq!(d.line_addr, line_addr);
    assert_eq!(cache.line_addr(addr), line_addr);
}

/// Lines that share a set never share a tag.
#[test]
fn same_set_lines_have_distinct_tags() {
    let cache = cache(ReplacementPolicy::TrueLru, 8, 4);
    let a = cache.index(0x0000);
    let b = cache.index(0x0200);
    assert_eq!(a.set, b.set);
    assert_ne!(a.tag, b.tag);
}

// ══════════════════════════════════════════════════════════
// 2. Properties
// ══════════════════════════════════════════════════════════

proptest! {
    /// Line base plus offset reproduces the address, and tag/set rebuild the base.
    #[test]
    fn decomposition_round_trip(addr in any::<u64>()) {
        let cache = cache(ReplacementPolicy::TrueLru, 16, 2);
        let layout = cache.layout();
        let d = cache.index(addr);
        prop_assert_eq!(d.line_addr | layout.offset(addr), addr);
        prop_assert_eq!(layout.compose(d.tag, d.set), d.line_addr);
        prop_assert!(d.set < 16);
    }

    /// A probe of any address in a freshly inserted line hits with the same base.
    #[test]
    fn probe_after_insert_hits_whole_line(base in 0u64..1 << 40, offset in 0..LINE) {
        let mut cache = cache(ReplacementPolicy::TrueLru, 16, 2);
        let line_addr = cache.insert(0, base, false).line_addr;
        let probe = cache.probe((base & !(LINE - 1)) + offset, true);
        prop_assert!(probe.is_hit());
        prop_assert_eq!(probe.line_addr, line_addr);
    }
}
