//! Unsure lists for oracle (Belady) replacement.
//!
//! Each set holds a number of *sure* lines, known to be re-referenced before
//! anything that would displace them, plus an unbounded map of *unsure* lines
//! that may or may not be needed. The caller probes before every insert, so
//! a re-reference to an unsure line proves it was worth keeping: it is promoted
//! into a free way at that moment. Lines never re-referenced before the set
//! fills with sure lines are dropped wholesale. The resulting miss count is the
//! one Belady's MIN would produce, without simulating the future.
//!
//! Payloads are moved between the line array and the unsure map; a demoted
//! way receives a fresh payload from the cache's factory.

use std::collections::HashMap;
use std::mem;

use super::line::{Line, SetStore};
use crate::common::Slot;

/// A demoted line and its payload.
#[derive(Debug)]
pub struct UnsureLine<T> {
    /// Metadata as it was in the line array.
    pub line: Line,
    /// Payload moved out of the line array.
    pub data: T,
}

/// Outcome of placing a new line in an oracle set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Way the new line takes.
    pub way: usize,
    /// Number of sure lines moved to the unsure list first.
    pub demoted: usize,
}

/// Per-set sure counts and unsure maps.
#[derive(Debug)]
pub struct UnsureLists<T> {
    lists: Vec<HashMap<u64, UnsureLine<T>>>,
    sure: Vec<usize>,
    ways: usize,
}

impl<T> UnsureLists<T> {
    /// Creates empty lists for `sets` sets of `ways` ways.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            lists: (0..sets).map(|_| HashMap::new()).collect(),
            sure: vec![0; sets],
            ways,
        }
    }

    /// Ways of `set` occupied by sure lines.
    pub fn sure_count(&self, set: usize) -> usize {
        self.sure[set]
    }

    /// Lines of `set` waiting in the unsure list.
    pub fn unsure_len(&self, set: usize) -> usize {
        self.lists[set].len()
    }

    /// Returns `true` if `tag` waits in the unsure list of `set`.
    pub fn contains(&self, set: usize, tag: u64) -> bool {
        self.lists[set].contains_key(&tag)
    }

    /// Resolves a line-array miss against the unsure list.
    ///
    /// A matching unsure line is moved into the first free way of `set` and
    /// becomes sure. When the sure count reaches associativity the rest of the
    /// list is dropped. Returns the way, or `None` if `tag` is not unsure.
    ///
    /// # Panics
    ///
    /// Panics if the set has no free way, which means the sure count no longer
    /// matches the line array.
    pub fn promote(
        &mut self,
        store: &mut SetStore<T>,
        set: usize,
        tag: u64,
        now: u64,
    ) -> Option<usize> {
        let UnsureLine { mut line, data } = self.lists[set].remove(&tag)?;
        let Some(way) = store.first_invalid(set) else {
            panic!("unsure line promoted into full set {set} (sure count {})", self.sure[set]);
        };
        line.last_access = now;
        let (slot_line, slot_data) = store.entry_mut(Slot::new(set, way));
        *slot_line = line;
        *slot_data = data;
        self.sure[set] += 1;
        if self.sure[set] == self.ways {
            self.lists[set].clear();
        }
        Some(way)
    }

    /// Chooses the way for a new sure line in `set`.
    ///
    /// If the set already has unsure lines, or every way holds a sure line,
    /// all valid lines are demoted into the unsure list and the new line takes
    /// way 0 as the only sure line. Otherwise it takes the first free way.
    ///
    /// # Panics
    ///
    /// Panics if the number of demoted lines differs from the sure count, or if
    /// no way is free when no demotion is due.
    pub fn place(
        &mut self,
        store: &mut SetStore<T>,
        set: usize,
        fresh: &dyn Fn() -> T,
    ) -> Placement {
        if !self.lists[set].is_empty() || self.sure[set] == self.ways {
            let mut demoted = 0;
            for way in 0..self.ways {
                let (line, data) = store.entry_mut(Slot::new(set, way));
                if !line.valid {
                    continue;
                }
                let unsure = UnsureLine {
                    line: line.clone(),
                    data: mem::replace(data, fresh()),
                };
                line.invalidate();
                let _ = self.lists[set].insert(unsure.line.tag, unsure);
                demoted += 1;
            }
            assert_eq!(
                demoted, self.sure[set],
                "set {set}: demoted {demoted} lines but {} were sure",
                self.sure[set]
            );
            self.sure[set] = 1;
            return Placement { way: 0, demoted };
        }
        let Some(way) = store.first_invalid(set) else {
            panic!("set {set}: no free way with sure count {}", self.sure[set]);
        };
        self.sure[set] += 1;
        Placement { way, demoted: 0 }
    }

    /// Drops `tag` from the unsure list of `set`; returns `true` if it was there.
    pub fn forget(&mut self, set: usize, tag: u64) -> bool {
        self.lists[set].remove(&tag).is_some()
    }

    /// Accounts for a sure line of `set` being invalidated.
    pub fn release(&mut self, set: usize) {
        self.sure[set] = self.sure[set].saturating_sub(1);
    }

    /// Empties every list and zeroes every sure count.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
        self.sure.fill(0);
    }
}
