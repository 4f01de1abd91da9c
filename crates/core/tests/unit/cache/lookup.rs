//! Lookup and Insert Tests.
//!
//! Covers the probe/insert contract shared by every discipline: misses on an
//! empty cache, hits after an insert, payload ownership, victim reporting, and
//! the logical clock.

use cachesim_core::config::ReplacementPolicy;
use cachesim_core::{ByteCache, Cache, CacheConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{cache, config, line_in_set};

/// Every discipline misses on an empty cache and hits after the insert.
#[rstest]
fn probe_insert_probe(#[values(
    ReplacementPolicy::TrueLru,
    ReplacementPolicy::Random,
    ReplacementPolicy::NotMru,
    ReplacementPolicy::RoundRobin,
    ReplacementPolicy::Ideal,
    ReplacementPolicy::LowPref,
    ReplacementPolicy::ShadowIdeal,
    ReplacementPolicy::IdealStorage,
    ReplacementPolicy::Partition,
    ReplacementPolicy::Srrip,
    ReplacementPolicy::Mru
)] policy: ReplacementPolicy) {
    let mut cache = cache(policy, 4, 2);
    assert!(!cache.probe(0x1000, true).is_hit());
    let ins = cache.insert(0, 0x1010, false);
    assert_eq!(ins.line_addr, 0x1000);
    assert_eq!(ins.victim, None);
    *ins.data = 99;
    let probe = cache.probe(0x103F, true);
    assert_eq!(probe.line_addr, 0x1000);
    assert_eq!(probe.data.copied(), Some(99));
    assert!(!cache.probe(0x1040, true).is_hit());
}

/// A probe miss does not allocate.
#[test]
fn miss_does_not_allocate() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 4, 2);
    for _ in 0..3 {
        assert!(!cache.probe(0x80, true).is_hit());
    }
    assert_eq!(cache.valid_ways(cache.index(0x80).set), 0);
    assert_eq!(cache.stats().misses, 3);
}

/// Payloads written through a hit persist.
#[test]
fn payload_written_through_probe() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 4, 2);
    let _ = cache.insert(0, 0x40, false);
    if let Some(data) = cache.probe(0x40, true).data {
        *data += 5;
    }
    assert_eq!(cache.probe(0x40, false).data.copied(), Some(5));
}

/// Byte caches hand out zeroed buffers of the configured payload size.
#[test]
fn byte_cache_payloads() {
    let config = CacheConfig::new("bytes", 1024, 2, 64, 16, ReplacementPolicy::TrueLru);
    let mut cache = ByteCache::from_config(&config).unwrap();
    assert_eq!(cache.payload_bytes(), 16);
    let ins = cache.insert(0, 0x0, false);
    assert_eq!(ins.data.len(), 16);
    assert!(ins.data.iter().all(|&b| b == 0));
    ins.data[3] = 0xAB;
    assert_eq!(cache.probe(0x0, true).data.map(|d| d[3]), Some(0xAB));
}

/// Custom payload factories are used for every way.
#[test]
fn custom_payload_factory() {
    let config = config(ReplacementPolicy::TrueLru, 2, 2);
    let mut cache = Cache::with_payload(&config, || String::from("fresh")).unwrap();
    let ins = cache.insert(0, 0x0, false);
    assert_eq!(ins.data.as_str(), "fresh");
}

/// The evicted line's base address is reported and its payload is reused.
#[test]
fn eviction_reports_victim() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 2, 1);
    let a = line_in_set(2, 1, 0);
    let b = line_in_set(2, 1, 1);
    *cache.insert(0, a, false).data = 7;
    assert!(!cache.probe(b, true).is_hit());
    let ins = cache.insert(0, b, false);
    assert_eq!(ins.victim, Some(a));
    assert_eq!(*ins.data, 7);
    assert_eq!(cache.stats().evictions, 1);
}

/// Lines in different sets never displace each other.
#[test]
fn sets_are_independent() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 4, 1);
    for set in 0..4 {
        let ins = cache.insert(0, line_in_set(4, set, 0), false);
        assert_eq!(ins.victim, None);
    }
    for set in 0..4 {
        assert!(cache.probe(line_in_set(4, set, 0), true).is_hit());
        assert_eq!(cache.valid_ways(set), 1);
    }
}

/// The clock starts at one and ticks once per probe and once per insert.
#[test]
fn clock_ticks_per_operation() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 1, 2);
    assert_eq!(cache.now(), 1);
    let _ = cache.probe(0x0, true);
    assert_eq!(cache.now(), 2);
    let _ = cache.insert(0, 0x0, false);
    assert_eq!(cache.now(), 3);
    assert_eq!(cache.lines(0)[0].last_access, 2);
    assert_eq!(cache.lines(0)[0].inserted, 2);
    let _ = cache.probe(0x0, true);
    assert_eq!(cache.lines(0)[0].last_access, 3);
}

/// Accessors reflect the configuration.
#[test]
fn geometry_accessors() {
    let config = CacheConfig::new("l1d", 32 * 1024, 8, 64, 0, ReplacementPolicy::NotMru)
        .with_tenants(4);
    let cache: Cache<u64> = Cache::new(&config).unwrap();
    assert_eq!(cache.name(), "l1d");
    assert_eq!(cache.policy(), ReplacementPolicy::NotMru);
    assert_eq!(cache.sets(), 64);
    assert_eq!(cache.ways(), 8);
    assert_eq!(cache.line_bytes(), 64);
    assert_eq!(cache.tenants(), 4);
    assert_eq!(cache.layout().set_bits, 6);
    assert!(format!("{cache:?}").contains("l1d"));
}

/// Inserting for a tenant outside the configured range is a contract violation.
#[test]
#[should_panic(expected = "tenant 1 out of range")]
fn insert_unknown_tenant_panics() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 1, 2);
    let _ = cache.insert(1, 0x0, false);
}

/// Inserting a line that is already present is a contract violation.
#[test]
#[should_panic(expected = "already present")]
fn duplicate_insert_panics() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 1, 2);
    let _ = cache.insert(0, 0x0, false);
    let _ = cache.insert(0, 0x0, false);
}

/// The duplicate check holds in every build, for every discipline and
/// insertion position, so a set can never hold two copies of a line.
#[rstest]
#[should_panic(expected = "already present")]
fn duplicate_insert_panics_for_every_discipline(
    #[values(
        ReplacementPolicy::TrueLru,
        ReplacementPolicy::Mru,
        ReplacementPolicy::Ideal,
        ReplacementPolicy::ShadowIdeal,
        ReplacementPolicy::IdealStorage,
        ReplacementPolicy::Srrip
    )]
    policy: ReplacementPolicy,
) {
    let mut cache = cache(policy, 1, 4);
    assert!(!cache.probe(0x40, true).is_hit());
    let _ = cache.insert(0, 0x40, false);
    let _ = cache.insert_lru(0, 0x40);
}
