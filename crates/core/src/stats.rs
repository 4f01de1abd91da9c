//! Cache statistics collection and reporting.
//!
//! This module tracks the accounting of one cache instance. It provides:
//! 1. **Accesses:** Probes, hits, misses, and demand (counted) hits.
//! 2. **Replacement:** Inserts, evictions of valid lines, and invalidations.
//! 3. **Side structures:** Oracle promotions and demotions, shadow swaps and
//!    discards, and bounded-oracle ring hits.
//!
//! Counters are plain integers updated by the engine; derived rates are
//! computed on demand. The structure serializes with `serde` so the CLI can
//! emit it as JSON.

use std::fmt::Write as _;

use serde::Serialize;

/// Section names accepted by [`CacheStats::report_sections`].
pub const SECTIONS: [&str; 3] = ["access", "replacement", "side"];

/// Statistics of a single cache instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls to `probe`.
    pub probes: u64,
    /// Probes that found the line (including side-structure resolutions).
    pub hits: u64,
    /// Probes that did not find the line.
    pub misses: u64,
    /// Hits on probes flagged as counting toward replacement order.
    pub demand_hits: u64,
    /// Lines inserted.
    pub inserts: u64,
    /// Inserts that displaced a valid line.
    pub evictions: u64,
    /// Invalidations that removed a line.
    pub invalidations: u64,
    /// Oracle misses resolved by promoting an unsure line.
    pub unsure_promotions: u64,
    /// Sure lines moved to an unsure list.
    pub oracle_demotions: u64,
    /// Shadow lines swapped back into the primary array.
    pub shadow_promotions: u64,
    /// Shadow lines dropped for being older than the primary LRU line.
    pub shadow_discards: u64,
    /// Probes answered by the bounded-oracle ring.
    pub ideal_storage_hits: u64,
}

impl CacheStats {
    /// Fraction of probes that hit, in `[0, 1]`; zero before any probe.
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }

    /// Fraction of probes that missed, in `[0, 1]`; zero before any probe.
    pub fn miss_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.misses as f64 / self.probes as f64
        }
    }

    /// Renders the requested sections as a text block.
    ///
    /// # Arguments
    ///
    /// * `name` - Cache name printed in the banner.
    /// * `sections` - Sections to include (see [`SECTIONS`]); empty means all.
    pub fn report_sections(&self, name: &str, sections: &[&str]) -> String {
        let want = |s: &str| sections.is_empty() || sections.contains(&s);
        let mut out = String::new();
        let _ = writeln!(out, "==========================================================");
        let _ = writeln!(out, "CACHE STATISTICS: {name}");
        let _ = writeln!(out, "==========================================================");
        if want("access") {
            let _ = writeln!(out, "ACCESSES");
            let _ = writeln!(out, "  probes                 {}", self.probes);
            let _ = writeln!(out, "  hits                   {}", self.hits);
            let _ = writeln!(out, "  misses                 {}", self.misses);
            let _ = writeln!(out, "  demand_hits            {}", self.demand_hits);
            let _ = writeln!(out, "  hit_rate               {:.2}%", self.hit_rate() * 100.0);
            let _ = writeln!(out, "  miss_rate              {:.2}%", self.miss_rate() * 100.0);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("replacement") {
            let _ = writeln!(out, "REPLACEMENT");
            let _ = writeln!(out, "  inserts                {}", self.inserts);
            let _ = writeln!(out, "  evictions              {}", self.evictions);
            let _ = writeln!(out, "  invalidations          {}", self.invalidations);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("side") {
            let _ = writeln!(out, "SIDE STRUCTURES");
            let _ = writeln!(out, "  unsure_promotions      {}", self.unsure_promotions);
            let _ = writeln!(out, "  oracle_demotions       {}", self.oracle_demotions);
            let _ = writeln!(out, "  shadow_promotions      {}", self.shadow_promotions);
            let _ = writeln!(out, "  shadow_discards        {}", self.shadow_discards);
            let _ = writeln!(out, "  ideal_storage_hits     {}", self.ideal_storage_hits);
        }
        let _ = writeln!(out, "==========================================================");
        out
    }

    /// Renders every section.
    pub fn report(&self, name: &str) -> String {
        self.report_sections(name, &[])
    }

    /// Prints every section to stdout.
    pub fn print(&self, name: &str) {
        print!("{}", self.report(name));
    }
}
