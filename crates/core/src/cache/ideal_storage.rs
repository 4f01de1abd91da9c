//! Bounded oracle ("ideal storage") ring.
//!
//! Each set owns a fixed-capacity ring of entries ordered by insertion, with a
//! queue end marking the next slot to overwrite. Every entry carries a priority
//! counter that starts at the associativity. A hit on anything but the newest
//! entry decrements the counters from the hit position up to the newest; once
//! a counter reaches zero, that entry and everything older is dropped, because
//! at least `ways` distinct lines were used since. The hit line is then moved
//! to the newest position with a fresh counter.
//!
//! The ring is the authority for hits and payloads; the cache also mirrors
//! every line into its primary array under true LRU so occupancy can be
//! compared against a causal cache of the same size.

use super::line::{Line, SetStore};
use crate::common::{Geometry, Slot, TenantId};

/// Result of a ring lookup that found the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingHit {
    /// Ring slot now holding the line.
    pub slot: usize,
    /// Entries dropped because their counter reached zero.
    pub dropped: usize,
}

/// Per-set rings with priority counters.
#[derive(Debug)]
pub struct IdealStorage<T> {
    ring: SetStore<T>,
    counters: Vec<usize>,
    queue_end: Vec<usize>,
    entries: usize,
    ways: usize,
}

impl<T> IdealStorage<T> {
    /// Allocates `sets` rings of `entries` slots for a `ways`-way cache.
    pub fn new(sets: usize, entries: usize, ways: usize, fresh: &dyn Fn() -> T) -> Self {
        let geometry = Geometry::new(sets, entries);
        Self {
            ring: SetStore::new(geometry, 0, fresh),
            counters: vec![0; geometry.len()],
            queue_end: vec![0; sets],
            entries,
            ways,
        }
    }

    /// Ring slot at `rel` positions after the oldest one.
    #[inline]
    fn physical(&self, set: usize, rel: usize) -> usize {
        (self.queue_end[set] + rel) % self.entries
    }

    /// Position of ring slot `slot` counted from the oldest one.
    #[inline]
    fn relative(&self, set: usize, slot: usize) -> usize {
        (slot + self.entries - self.queue_end[set]) % self.entries
    }

    fn flat(&self, set: usize, slot: usize) -> usize {
        self.ring.geometry().flat(Slot::new(set, slot))
    }

    /// Looks `tag` up in the ring of `set`, applying the counter decay.
    pub fn lookup(&mut self, set: usize, tag: u64) -> Option<RingHit> {
        let hit = self.ring.find(set, tag)?;
        let hit_rel = self.relative(set, hit);
        if hit_rel == self.entries - 1 {
            return Some(RingHit { slot: hit, dropped: 0 });
        }

        let mut last_zero = None;
        for rel in hit_rel..self.entries {
            let slot = self.physical(set, rel);
            if !self.ring.line(Slot::new(set, slot)).valid {
                continue;
            }
            let idx = self.flat(set, slot);
            self.counters[idx] = self.counters[idx].saturating_sub(1);
            if self.counters[idx] == 0 {
                last_zero = Some(rel);
            }
        }

        let line = self.ring.line(Slot::new(set, hit)).clone();
        let mut dropped = 0;
        if let Some(last_zero) = last_zero {
            for rel in 0..=last_zero {
                let slot = self.physical(set, rel);
                let entry = self.ring.line_mut(Slot::new(set, slot));
                if entry.valid && slot != hit {
                    dropped += 1;
                }
                entry.invalidate();
            }
        }
        self.ring.line_mut(Slot::new(set, hit)).invalidate();

        self.ring
            .swap_data(Slot::new(set, self.queue_end[set]), Slot::new(set, hit));
        let slot = self.push_line(set, line);
        Some(RingHit { slot, dropped })
    }

    /// Writes `line` at the queue end of `set` with a fresh counter.
    fn push_line(&mut self, set: usize, line: Line) -> usize {
        let end = self.queue_end[set];
        *self.ring.line_mut(Slot::new(set, end)) = Line { valid: true, ..line };
        let idx = self.flat(set, end);
        self.counters[idx] = self.ways;
        self.queue_end[set] = (end + 1) % self.entries;
        end
    }

    /// Pushes a newly inserted line at the queue end of `set`.
    ///
    /// Returns the ring slot and the line-base address of the overwritten
    /// entry, if it was valid.
    pub fn push(
        &mut self,
        set: usize,
        tag: u64,
        base: u64,
        tenant: TenantId,
        now: u64,
    ) -> (usize, Option<u64>) {
        let end = self.queue_end[set];
        let old = self.ring.line(Slot::new(set, end));
        let victim = old.valid.then_some(old.base);
        let slot = self.push_line(
            set,
            Line {
                tag,
                base,
                tenant,
                last_access: now,
                inserted: now,
                ..Line::default()
            },
        );
        (slot, victim)
    }

    /// Entry that the next push into `set` would overwrite.
    pub fn next_victim(&self, set: usize) -> (&Line, &T) {
        let slot = Slot::new(set, self.queue_end[set]);
        (self.ring.line(slot), self.ring.data(slot))
    }

    /// Payload held in ring slot `slot` of `set`.
    pub fn data_mut(&mut self, set: usize, slot: usize) -> &mut T {
        self.ring.data_mut(Slot::new(set, slot))
    }

    /// Priority counter of ring slot `slot` in `set`.
    pub fn counter(&self, set: usize, slot: usize) -> usize {
        self.counters[self.flat(set, slot)]
    }

    /// Number of valid ring entries in `set`.
    pub fn valid_count(&self, set: usize) -> usize {
        self.ring.valid_count(set)
    }

    /// Returns `true` if the ring of `set` holds `tag`.
    pub fn contains(&self, set: usize, tag: u64) -> bool {
        self.ring.find(set, tag).is_some()
    }

    /// Sets the dirty flag of `tag` in the ring of `set`.
    pub fn mark_dirty(&mut self, set: usize, tag: u64) -> bool {
        match self.ring.find(set, tag) {
            Some(slot) => {
                self.ring.line_mut(Slot::new(set, slot)).dirty = true;
                true
            }
            None => false,
        }
    }

    /// Ring entries of every set.
    pub const fn slots(&self) -> &SetStore<T> {
        &self.ring
    }

    /// Drops `tag` from the ring of `set`.
    pub fn forget(&mut self, set: usize, tag: u64) -> bool {
        let mut found = false;
        for line in self.ring.set_mut(set) {
            if line.holds(tag) {
                line.invalidate();
                found = true;
            }
        }
        found
    }

    /// Invalidates every entry and rewinds every queue end.
    pub fn clear(&mut self) {
        self.ring.invalidate_all(0);
        self.counters.fill(0);
        self.queue_end.fill(0);
    }
}
