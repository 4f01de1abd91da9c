//! Cache construction errors.
//!
//! Configuration problems are the only recoverable failures in the engine and
//! are reported from `Cache::new`. Contract violations at run time (asking the
//! oracle for a victim, inconsistent partition quotas, inserting a line that is
//! already present) are programming errors and panic instead, since continuing
//! would corrupt the hit/miss accounting the simulator reports.

use thiserror::Error;

/// Reasons a cache cannot be built from its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Associativity of zero.
    #[error("cache '{name}': associativity must be at least 1")]
    ZeroWays {
        /// Cache name.
        name: String,
    },

    /// Line size is zero or not a power of two.
    #[error("cache '{name}': line size {line_bytes} is not a power of two")]
    LineSize {
        /// Cache name.
        name: String,
        /// Configured line size in bytes.
        line_bytes: usize,
    },

    /// Total size is not a whole number of sets.
    #[error(
        "cache '{name}': size {size_bytes} is not a multiple of line size {line_bytes} x {ways} ways"
    )]
    SizeNotDivisible {
        /// Cache name.
        name: String,
        /// Configured total size in bytes.
        size_bytes: usize,
        /// Configured line size in bytes.
        line_bytes: usize,
        /// Configured associativity.
        ways: usize,
    },

    /// Derived set count is zero or not a power of two.
    #[error("cache '{name}': set count {sets} is not a power of two")]
    SetCount {
        /// Cache name.
        name: String,
        /// Derived number of sets.
        sets: usize,
    },

    /// Tenant count is zero or exceeds the tenant id range.
    #[error("cache '{name}': tenant count {tenants} out of range 1..={max}")]
    Tenants {
        /// Cache name.
        name: String,
        /// Configured tenant count.
        tenants: usize,
        /// Largest supported tenant count.
        max: usize,
    },

    /// Initial partition quotas do not cover the associativity exactly.
    #[error("cache '{name}': partition quotas {quotas:?} must give every tenant a way and sum to {ways}")]
    PartitionQuota {
        /// Cache name.
        name: String,
        /// Configured quotas, one per tenant.
        quotas: Vec<usize>,
        /// Associativity the quotas must sum to.
        ways: usize,
    },

    /// A side-structure capacity is zero.
    #[error("cache '{name}': {what} capacity must be at least 1")]
    Capacity {
        /// Cache name.
        name: String,
        /// Which structure was misconfigured.
        what: &'static str,
    },

    /// RRPV width outside the supported range.
    #[error("cache '{name}': rrpv width {bits} must be between 1 and 7 bits")]
    RrpvBits {
        /// Cache name.
        name: String,
        /// Configured width.
        bits: u8,
    },
}
