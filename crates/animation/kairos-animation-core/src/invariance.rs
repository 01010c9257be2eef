//! Invariance: the time ranges over which a curve's output is known to be constant.
//!
//! Regions are kept in a `BTreeMap` keyed by lower bound. Stored regions are
//! always proper, pairwise disjoint and sorted; two regions may touch, and the
//! boundary between them (or any gap) means the value may differ there.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

use crate::interval::Interval;
use crate::time::Time;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Invariance {
    regions: BTreeMap<Time, Interval>,
}

impl Invariance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invariance holding a single region (or nothing if `interval` is not proper).
    pub fn from_interval(interval: Interval) -> Self {
        let mut inv = Self::new();
        inv.write(interval);
        inv
    }

    /// Constant everywhere.
    pub fn universal() -> Self {
        Self::from_interval(Interval::UNIVERSAL)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Stored regions in time order.
    pub fn intervals(&self) -> impl Iterator<Item = &Interval> + '_ {
        self.regions.values()
    }

    /// Mark `interval` as one constant region, overriding whatever was stored there.
    /// Non-proper intervals carry no constancy information and are ignored.
    pub fn write(&mut self, interval: Interval) {
        if !interval.is_proper() {
            return;
        }
        self.remove(interval);
        self.insert(interval);
    }

    /// Drop any constancy inside `interval`. Regions straddling its bounds keep
    /// their proper remainders.
    pub fn remove(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }
        for key in self.overlapping_keys(&interval) {
            let Some(region) = self.regions.remove(&key) else {
                continue;
            };
            for piece in region.get_difference(&interval) {
                if piece.is_proper() {
                    self.insert(piece);
                }
            }
        }
    }

    /// The parts of stored regions that fall inside `range`.
    pub fn get_narrowed(&self, range: Interval) -> Invariance {
        let mut out = Invariance::new();
        if range.is_empty() {
            return out;
        }
        for key in self.overlapping_keys(&range) {
            if let Some(region) = self.regions.get(&key) {
                let piece = region.get_intersection(&range);
                if piece.is_proper() {
                    out.insert(piece);
                }
            }
        }
        out
    }

    /// Grow `interval` to the outer bounds of every stored region it intersects,
    /// so a later `modify` over the result never cuts a region in two.
    pub fn expand_interval_by_alignment(&self, interval: Interval) -> Interval {
        if interval.is_empty() {
            return interval;
        }
        let (mut lower, mut l_open) = (interval.lower(), interval.is_lower_open());
        let (mut upper, mut u_open) = (interval.upper(), interval.is_upper_open());

        let overlapping = self.overlapping_keys(&interval);
        if let Some(first) = overlapping.first().and_then(|k| self.regions.get(k)) {
            if first.lower() < lower || (first.lower() == lower && !first.is_lower_open()) {
                lower = first.lower();
                l_open = first.is_lower_open();
            }
        }
        if let Some(last) = overlapping.last().and_then(|k| self.regions.get(k)) {
            if last.upper() > upper || (last.upper() == upper && !last.is_upper_open()) {
                upper = last.upper();
                u_open = last.is_upper_open();
            }
        }
        Interval::new(lower, upper, l_open, u_open)
    }

    /// Replace everything inside `range` with the content of `sub` inside `range`.
    pub fn modify(&mut self, range: Interval, sub: &Invariance) {
        self.remove(range);
        for region in sub.get_narrowed(range).regions.into_values() {
            self.insert(region);
        }
    }

    /// Constant only where every input is constant. An empty list is constant everywhere.
    pub fn merge(invariances: &[Invariance]) -> Invariance {
        let Some((first, rest)) = invariances.split_first() else {
            return Invariance::universal();
        };
        rest.iter().fold(first.clone(), |acc, inv| acc.intersect(inv))
    }

    fn intersect(&self, other: &Invariance) -> Invariance {
        let mut out = Invariance::new();
        for region in self.regions.values() {
            for key in other.overlapping_keys(region) {
                if let Some(theirs) = other.regions.get(&key) {
                    let piece = region.get_intersection(theirs);
                    if piece.is_proper() {
                        out.insert(piece);
                    }
                }
            }
        }
        out
    }

    /// Keys of stored regions that share at least one point with `interval`.
    fn overlapping_keys(&self, interval: &Interval) -> Vec<Time> {
        let mut keys = Vec::new();
        if interval.is_empty() {
            return keys;
        }
        // Only the last region starting before `interval` can reach into it.
        if let Some((key, region)) = self
            .regions
            .range((Unbounded, Excluded(interval.lower())))
            .next_back()
        {
            if !region.get_intersection(interval).is_empty() {
                keys.push(*key);
            }
        }
        for (key, region) in self
            .regions
            .range((Included(interval.lower()), Included(interval.upper())))
        {
            if !region.get_intersection(interval).is_empty() {
                keys.push(*key);
            }
        }
        keys
    }

    /// Callers guarantee `region` is proper and overlaps nothing stored.
    fn insert(&mut self, region: Interval) {
        debug_assert!(region.is_proper());
        debug_assert!(self.overlapping_keys(&region).is_empty());
        self.regions.insert(region.lower(), region);
    }
}
