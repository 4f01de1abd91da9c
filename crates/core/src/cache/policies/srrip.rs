//! Static Re-Reference Interval Prediction (SRRIP) Replacement Policy.
//!
//! Every line carries an RRPV counter of `rrpv_bits` bits. Zero predicts a
//! near re-reference and the maximum predicts a distant one.
//!
//! - **Fill:** New lines start at `max - 1` ("long" interval).
//! - **Hit:** The counter is reset to zero.
//! - **Victim:** The first invalid way, else the first way at the maximum. If no
//!   way is at the maximum, the way with the largest counter is chosen and the
//!   whole set is aged by the missing distance right before the fill.

use super::{ReplacementPolicy, Touch, VictimQuery};
use crate::cache::line::Line;
use crate::common::constants::MAX_RRPV_BITS;
use crate::common::CacheError;
use crate::config::CacheConfig;

/// SRRIP Policy state.
#[derive(Debug, Clone, Copy)]
pub struct SrripPolicy {
    /// Largest counter value (`2^bits - 1`).
    max_rrpv: u8,
}

impl SrripPolicy {
    /// Creates the policy from a cache configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::RrpvBits`] unless `1 <= rrpv_bits <= 7`.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        if config.rrpv_bits == 0 || config.rrpv_bits > MAX_RRPV_BITS {
            return Err(CacheError::RrpvBits {
                name: config.name.clone(),
                bits: config.rrpv_bits,
            });
        }
        Ok(Self {
            max_rrpv: (1u8 << config.rrpv_bits) - 1,
        })
    }

    /// Largest counter value; also the value given to invalid lines.
    pub const fn max_rrpv(&self) -> u8 {
        self.max_rrpv
    }

    /// Counter value of a line inserted with a distant prediction.
    pub const fn long_rrpv(&self) -> u8 {
        self.max_rrpv.saturating_sub(1)
    }
}

impl ReplacementPolicy for SrripPolicy {
    fn find_victim(&self, query: VictimQuery<'_>) -> usize {
        if let Some(way) = query.lines.iter().position(|line| !line.valid) {
            return way;
        }
        let mut victim = 0;
        let mut highest = 0;
        for (way, line) in query.lines.iter().enumerate() {
            if line.rrpv >= self.max_rrpv {
                return way;
            }
            if line.rrpv > highest {
                highest = line.rrpv;
                victim = way;
            }
        }
        victim
    }

    fn touch(&mut self, _set: usize, way: usize, lines: &mut [Line], now: u64, touch: Touch) {
        let line = &mut lines[way];
        line.last_access = now;
        line.rrpv = match touch {
            Touch::Hit => 0,
            Touch::Fill => self.long_rrpv(),
        };
    }

    /// Ages every valid line so the chosen victim would have reached the maximum.
    fn before_fill(&mut self, _set: usize, way: usize, lines: &mut [Line]) {
        if !lines[way].valid {
            return;
        }
        let gap = self.max_rrpv.saturating_sub(lines[way].rrpv);
        if gap == 0 {
            return;
        }
        for line in lines.iter_mut().filter(|line| line.valid) {
            line.rrpv = line.rrpv.saturating_add(gap).min(self.max_rrpv);
        }
    }
}
