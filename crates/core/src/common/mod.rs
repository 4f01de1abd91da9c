//! Common utilities and types used throughout the cache engine.
//!
//! This module provides the building blocks shared by the cache, its side
//! structures, and the replacement disciplines. It includes:
//! 1. **Address Types:** Decomposition of addresses into set, tag, and line base.
//! 2. **Slot Indexing:** Bounds-checked `(set, way)` coordinates.
//! 3. **Constants:** Default capacities and clock values.
//! 4. **Error Handling:** Construction errors for invalid configurations.

/// Address decomposition and slot indexing.
pub mod addr;

/// Engine-wide constants.
pub mod constants;

/// Error types for cache construction.
pub mod error;

pub use addr::{AddrLayout, Decomposed, Geometry, Slot, TenantId};
pub use error::CacheError;
