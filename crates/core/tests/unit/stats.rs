//! Statistics Tests.
//!
//! Verifies the counters the engine maintains and the text and JSON reports.

use cachesim_core::config::ReplacementPolicy;
use cachesim_core::stats::CacheStats;
use pretty_assertions::assert_eq;

use crate::common::harness::{cache, cyclic, replay};

/// Counters after a short LRU run.
#[test]
fn counters_track_probes_and_inserts() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 1, 2);
    let trace = cyclic(1, 3, 2);
    let tally = replay(&mut cache, &trace);
    let stats = cache.stats();

    assert_eq!(stats.probes, 6);
    assert_eq!(stats.hits + stats.misses, stats.probes);
    assert_eq!(stats.misses as usize, tally.misses);
    assert_eq!(stats.inserts, 6);
    assert_eq!(stats.evictions, 4);
    assert_eq!(stats.demand_hits, 0);
    assert_eq!(cache.demand_accesses(), 0);
}

/// Only counted probes contribute demand hits.
#[test]
fn demand_hits_require_counted_probes() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 1, 2);
    let _ = cache.insert(0, 0x0, false);
    let _ = cache.probe(0x0, false);
    let _ = cache.probe(0x0, true);
    assert_eq!(cache.stats().hits, 2);
    assert_eq!(cache.stats().demand_hits, 1);
    assert_eq!(cache.demand_accesses(), 1);
}

/// Resetting statistics keeps the contents.
#[test]
fn reset_stats_keeps_lines() {
    let mut cache = cache(ReplacementPolicy::TrueLru, 1, 2);
    let _ = cache.insert(0, 0x0, false);
    cache.reset_stats();
    assert_eq!(cache.stats(), &CacheStats::default());
    assert!(cache.probe(0x0, true).is_hit());
}

/// Rates divide by the probe count.
#[test]
fn rates() {
    let stats = CacheStats {
        probes: 8,
        hits: 6,
        misses: 2,
        ..CacheStats::default()
    };
    assert!((stats.hit_rate() - 0.75).abs() < 1e-12);
    assert!((stats.miss_rate() - 0.25).abs() < 1e-12);
}

/// The text report carries a banner and every section by default.
#[test]
fn report_text() {
    let stats = CacheStats {
        probes: 4,
        hits: 1,
        misses: 3,
        shadow_promotions: 2,
        ..CacheStats::default()
    };
    let report = stats.report("l2");
    assert!(report.contains("CACHE STATISTICS: l2"));
    assert!(report.contains("ACCESSES"));
    assert!(report.contains("REPLACEMENT"));
    assert!(report.contains("SIDE STRUCTURES"));
    assert!(report.contains("hit_rate               25.00%"));
    assert!(report.contains("shadow_promotions      2"));
}

/// Sections can be selected individually.
#[test]
fn report_selected_sections() {
    let report = CacheStats::default().report_sections("l1", &["replacement"]);
    assert!(report.contains("REPLACEMENT"));
    assert!(!report.contains("ACCESSES"));
    assert!(!report.contains("SIDE STRUCTURES"));
}

/// Statistics serialize as a flat JSON object of counters.
#[test]
fn report_json() {
    let stats = CacheStats {
        probes: 3,
        ideal_storage_hits: 1,
        ..CacheStats::default()
    };
    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["probes"], 3);
    assert_eq!(value["ideal_storage_hits"], 1);
    assert_eq!(value["evictions"], 0);
    assert_eq!(value.as_object().map(serde_json::Map::len), Some(12));
}
