//! Set-associative cache simulation engine.
//!
//! This crate models the address-to-line mapping and eviction behavior of a
//! hardware cache for a cycle-level simulator. It provides:
//! 1. **Common:** Address decomposition, set/way slot indexing, errors, and constants.
//! 2. **Configuration:** Serde-deserializable cache geometry and discipline selection.
//! 3. **Cache:** The `Cache` engine (probe, insert, invalidate, peek, reset) with
//!    oracle, shadow, and bounded-oracle side structures.
//! 4. **Policies:** One replacement discipline per type behind the `ReplacementPolicy` trait.
//! 5. **Statistics:** Per-instance hit/miss/eviction accounting and reporting.
//!
//! The engine is single-threaded and synchronous: each call runs to completion
//! and callers sequence accesses to a shared instance themselves.

/// Cache engine, line storage, side structures, and replacement disciplines.
pub mod cache;
/// Common types (address layout, slot indices, errors, constants).
pub mod common;
/// Cache configuration (geometry, discipline, insertion positions, defaults).
pub mod config;
/// Per-cache statistics collection and reporting.
pub mod stats;

/// Main cache type; construct with `Cache::new` from a `CacheConfig`.
pub use crate::cache::{ByteCache, Cache, Insertion, Probe, Victim};
/// Root configuration type; use `CacheConfig::default()` or deserialize from JSON.
pub use crate::config::CacheConfig;
/// Error type returned when a cache cannot be built from its configuration.
pub use crate::common::CacheError;
