//! Oracle (Belady) Replacement Marker.
//!
//! The oracle discipline never picks a victim from the line array. Lines whose
//! future is unknown wait in per-set unsure lists held by the cache, and the
//! decision to keep a line is made retroactively when it is re-referenced.
//! This type only guards the line-array entry points.

use super::{ReplacementPolicy, Touch, VictimQuery};
use crate::cache::line::Line;

/// Oracle Policy marker.
#[derive(Debug, Clone)]
pub struct IdealPolicy {
    /// Name of the owning cache, used in contract-violation messages.
    name: String,
}

impl IdealPolicy {
    /// Creates the marker for the cache named `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl ReplacementPolicy for IdealPolicy {
    /// # Panics
    ///
    /// Always panics: oracle replacement cannot name a victim in advance.
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        panic!(
            "{}: oracle replacement has no direct victim (set {})",
            self.name, query.set
        );
    }

    /// Hits on sure lines change nothing.
    fn touch(&mut self, _set: usize, _way: usize, _lines: &mut [Line], _now: u64, _touch: Touch) {}
}
