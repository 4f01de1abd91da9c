//! Engine-wide constants.

/// Default capacity of the per-set ring used by the bounded-oracle discipline.
pub const IDEAL_STORAGE_ENTRIES: usize = 256;

/// Timestamp given to lines inserted at the LRU position.
///
/// The logical clock starts above this value, so such lines always rank as the
/// oldest in their set.
pub const LRU_INSERT_TIME: u64 = 0;

/// First value of a cache's logical clock.
pub const CLOCK_START: u64 = 1;

/// Seed used for the random discipline when the configured seed is zero.
///
/// A xorshift generator never leaves the all-zero state.
pub const DEFAULT_RANDOM_SEED: u64 = 123456789;

/// Largest supported RRPV width in bits.
pub const MAX_RRPV_BITS: u8 = 7;
