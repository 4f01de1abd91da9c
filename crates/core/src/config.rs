//! Configuration system for the cache engine.
//!
//! This module defines the configuration structures and enums used to build a
//! cache. It provides:
//! 1. **Defaults:** Baseline geometry and side-structure capacities.
//! 2. **Structures:** `CacheConfig`, deserializable from JSON with per-field defaults.
//! 3. **Enums:** Replacement discipline and insertion position.
//!
//! Configuration is supplied as JSON by the CLI, or built in code starting from
//! `CacheConfig::default()`.

use serde::{Deserialize, Serialize};

/// Default configuration constants for a cache.
///
/// These values define the baseline geometry when not explicitly overridden.
mod defaults {
    /// Default cache name used in diagnostics.
    pub const NAME: &str = "cache";

    /// Default cache size in bytes (32 KiB).
    pub const SIZE: usize = 32 * 1024;

    /// Default cache line size in bytes (64 bytes).
    pub const LINE: usize = 64;

    /// Default cache associativity (8 ways).
    pub const WAYS: usize = 8;

    /// Default per-line payload size in bytes (no payload).
    pub const PAYLOAD: usize = 0;

    /// Default number of tenants sharing the cache.
    pub const TENANTS: usize = 1;

    /// Default seed of the per-instance random stream.
    pub const SEED: u64 = crate::common::constants::DEFAULT_RANDOM_SEED;

    /// Default per-set ring capacity for the bounded-oracle discipline.
    pub const IDEAL_STORAGE_ENTRIES: usize = crate::common::constants::IDEAL_STORAGE_ENTRIES;

    /// Default RRPV width for SRRIP (2 bits, values 0..=3).
    pub const RRPV_BITS: u8 = 2;
}

/// Cache replacement disciplines.
///
/// Specifies the algorithm used to select which line to evict when a new line
/// must be installed in a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementPolicy {
    /// True least-recently-used replacement.
    ///
    /// Evicts the valid line with the oldest timestamp; invalid ways first.
    #[default]
    #[serde(alias = "TrueLru", alias = "LRU", alias = "Lru")]
    TrueLru,
    /// Random replacement from a private seeded stream.
    #[serde(alias = "Random")]
    Random,
    /// Not-most-recently-used replacement.
    ///
    /// A per-set pointer that only moves off a way when that way is touched.
    #[serde(alias = "NotMru", alias = "NMRU")]
    NotMru,
    /// Round-robin replacement.
    ///
    /// A per-set pointer advanced on every touch.
    #[serde(alias = "RoundRobin")]
    RoundRobin,
    /// Oracle (Belady) replacement through per-set unsure lists.
    ///
    /// Requires callers to probe before every insert.
    #[serde(alias = "Ideal", alias = "Oracle", alias = "ORACLE")]
    Ideal,
    /// LRU that evicts prefetched lines before demand lines.
    #[serde(alias = "LowPref")]
    LowPref,
    /// True LRU with a shadow array of recently evicted lines.
    #[serde(alias = "ShadowIdeal")]
    ShadowIdeal,
    /// Bounded approximation of oracle replacement using a per-set ring.
    #[serde(alias = "IdealStorage")]
    IdealStorage,
    /// Way partitioning between tenants with fair over-occupancy draining.
    #[serde(alias = "Partition")]
    Partition,
    /// Static re-reference interval prediction.
    #[serde(alias = "Srrip")]
    Srrip,
    /// Most-recently-used replacement, prefetched lines first.
    ///
    /// Suits cyclic scans larger than the set.
    #[serde(alias = "Mru")]
    Mru,
}

impl ReplacementPolicy {
    /// Every discipline, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::TrueLru,
        Self::Random,
        Self::NotMru,
        Self::RoundRobin,
        Self::Ideal,
        Self::LowPref,
        Self::ShadowIdeal,
        Self::IdealStorage,
        Self::Partition,
        Self::Srrip,
        Self::Mru,
    ];

    /// Short lowercase name used in logs and reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::TrueLru => "true_lru",
            Self::Random => "random",
            Self::NotMru => "not_mru",
            Self::RoundRobin => "round_robin",
            Self::Ideal => "ideal",
            Self::LowPref => "low_pref",
            Self::ShadowIdeal => "shadow_ideal",
            Self::IdealStorage => "ideal_storage",
            Self::Partition => "partition",
            Self::Srrip => "srrip",
            Self::Mru => "mru",
        }
    }

    /// Returns `true` if the discipline can name a victim before an insert.
    pub const fn has_direct_victim(self) -> bool {
        !matches!(self, Self::Ideal)
    }
}

impl std::fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Recency position given to a newly inserted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsertPosition {
    /// Apply the discipline's own fill rule (most recently used for LRU-style policies).
    #[default]
    Default,
    /// Insert as the least recently used line of the set.
    Lru,
    /// Insert roughly a quarter of the way up the recency order.
    LowQuarter,
    /// Insert roughly in the middle of the recency order.
    Mid,
    /// Insert as the most recently used line of the set.
    Mru,
    /// Insert with a distant re-reference prediction.
    Srrip,
}

/// Configuration of one cache instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Name used in diagnostics and reports
    #[serde(default = "CacheConfig::default_name")]
    pub name: String,

    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Size of the opaque per-line payload in bytes (byte caches only)
    #[serde(default = "CacheConfig::default_payload")]
    pub payload_bytes: usize,

    /// Replacement discipline
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Number of tenants (cores) that may own lines
    #[serde(default = "CacheConfig::default_tenants")]
    pub tenants: usize,

    /// Seed of the private random stream (random discipline)
    #[serde(default = "CacheConfig::default_seed")]
    pub seed: u64,

    /// Ways per set of the shadow array (shadow-ideal discipline); defaults to `ways`
    #[serde(default)]
    pub shadow_ways: Option<usize>,

    /// Ring entries per set (ideal-storage discipline)
    #[serde(default = "CacheConfig::default_ideal_storage_entries")]
    pub ideal_storage_entries: usize,

    /// Width of the RRPV counter in bits (SRRIP discipline)
    #[serde(default = "CacheConfig::default_rrpv_bits")]
    pub rrpv_bits: u8,

    /// Initial ways per tenant (partition discipline); split evenly when absent
    #[serde(default)]
    pub partition: Option<Vec<usize>>,
}

impl CacheConfig {
    /// Returns the default cache name.
    fn default_name() -> String {
        defaults::NAME.to_string()
    }

    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Returns the default payload size in bytes.
    fn default_payload() -> usize {
        defaults::PAYLOAD
    }

    /// Returns the default tenant count.
    fn default_tenants() -> usize {
        defaults::TENANTS
    }

    /// Returns the default random seed.
    fn default_seed() -> u64 {
        defaults::SEED
    }

    /// Returns the default ring capacity for the bounded-oracle discipline.
    fn default_ideal_storage_entries() -> usize {
        defaults::IDEAL_STORAGE_ENTRIES
    }

    /// Returns the default RRPV width.
    fn default_rrpv_bits() -> u8 {
        defaults::RRPV_BITS
    }

    /// Builds a configuration from the classic constructor arguments: name,
    /// total bytes, associativity, line size, payload size, and discipline.
    /// Every other field keeps its default.
    pub fn new(
        name: impl Into<String>,
        size_bytes: usize,
        ways: usize,
        line_bytes: usize,
        payload_bytes: usize,
        policy: ReplacementPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            ways,
            line_bytes,
            payload_bytes,
            policy,
            ..Self::default()
        }
    }

    /// Sets the tenant count.
    #[must_use]
    pub const fn with_tenants(mut self, tenants: usize) -> Self {
        self.tenants = tenants;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the initial partition quotas, one entry per tenant.
    #[must_use]
    pub fn with_partition(mut self, quotas: Vec<usize>) -> Self {
        self.tenants = quotas.len();
        self.partition = Some(quotas);
        self
    }

    /// Number of sets implied by size, line size, and associativity.
    ///
    /// Returns zero when the geometry is degenerate; validation happens in
    /// `Cache::new`.
    pub const fn num_sets(&self) -> usize {
        if self.line_bytes == 0 || self.ways == 0 {
            return 0;
        }
        self.size_bytes / self.line_bytes / self.ways
    }

    /// Effective shadow array associativity.
    pub fn shadow_ways(&self) -> usize {
        self.shadow_ways.unwrap_or(self.ways)
    }

    /// Parses a configuration from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for this structure.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl Default for CacheConfig {
    /// Creates a default cache configuration.
    ///
    /// 32 KiB, 8-way, 64-byte lines, true LRU, one tenant, no payload.
    fn default() -> Self {
        Self {
            name: defaults::NAME.to_string(),
            size_bytes: defaults::SIZE,
            line_bytes: defaults::LINE,
            ways: defaults::WAYS,
            payload_bytes: defaults::PAYLOAD,
            policy: ReplacementPolicy::default(),
            tenants: defaults::TENANTS,
            seed: defaults::SEED,
            shadow_ways: None,
            ideal_storage_entries: defaults::IDEAL_STORAGE_ENTRIES,
            rrpv_bits: defaults::RRPV_BITS,
            partition: None,
        }
    }
}
