//! Index of where each tracked curve may change value.
//!
//! A curve's volatility is everything its invariance does not cover, split into
//! "breaks" between consecutive constant regions:
//! - a proper gap is a continuous volatile range;
//! - a single-point gap is a closed instant, reported when a query span contains it;
//! - two touching regions with no gap switch value at their shared bound. When the
//!   left region owns the bound the switch is reported for spans in `[a, b)`,
//!   otherwise for spans in `(a, b]`.
//!
//! A curve is reported for a span exactly when no constant region contains the
//! whole span.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

use hashbrown::HashSet;

use crate::ids::CurveId;
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;

pub type CurveSet = HashSet<CurveId>;

/// One break in a curve's invariance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Volatility {
    Range(Interval),
    Instant(Time),
    LeftClosed(Time),
    RightClosed(Time),
}

impl Volatility {
    fn location(&self) -> Interval {
        match *self {
            Volatility::Range(range) => range,
            Volatility::Instant(t) | Volatility::LeftClosed(t) | Volatility::RightClosed(t) => {
                Interval::single(t)
            }
        }
    }
}

/// The break between `left` and `right` (either may be the timeline end).
fn break_between(left: Option<&Interval>, right: Option<&Interval>) -> Option<Volatility> {
    let after = left.map_or(Interval::UNIVERSAL, |l| l.get_followings());
    let before = right.map_or(Interval::UNIVERSAL, |r| r.get_precedings());
    let gap = after.get_intersection(&before);
    if gap.is_proper() {
        return Some(Volatility::Range(gap));
    }
    if gap.is_single() {
        return Some(Volatility::Instant(gap.lower()));
    }
    match (left, right) {
        (Some(l), Some(_)) if !l.is_upper_open() => Some(Volatility::LeftClosed(l.upper())),
        (Some(_), Some(r)) => Some(Volatility::RightClosed(r.lower())),
        _ => None,
    }
}

/// Breaks of `invariance` whose location touches the closure of `near`.
pub(crate) fn volatilities(invariance: &Invariance, near: Interval) -> Vec<Volatility> {
    let regions: Vec<&Interval> = invariance.intervals().collect();
    let mut out = Vec::new();
    if regions.is_empty() {
        out.push(Volatility::Range(Interval::UNIVERSAL));
    } else {
        out.extend(break_between(None, regions.first().copied()));
        for pair in regions.windows(2) {
            out.extend(break_between(Some(pair[0]), Some(pair[1])));
        }
        out.extend(break_between(regions.last().copied(), None));
    }
    out.retain(|v| v.location().touches(&near));
    out
}

#[derive(Debug, Default)]
pub struct VaryCurves {
    /// Lower bound -> (proper volatile range, curves volatile there). Ranges are disjoint.
    continuous: BTreeMap<Time, (Interval, CurveSet)>,
    /// Closed instants.
    oneshot: BTreeMap<Time, CurveSet>,
    /// Switch owned by the left side, reported in `[a, b)`.
    oneshot_l: BTreeMap<Time, CurveSet>,
    /// Switch owned by the right side, reported in `(a, b]`.
    oneshot_r: BTreeMap<Time, CurveSet>,
    coalesce: bool,
}

impl VaryCurves {
    pub fn new(coalesce: bool) -> Self {
        Self {
            coalesce,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.continuous.is_empty()
            && self.oneshot.is_empty()
            && self.oneshot_l.is_empty()
            && self.oneshot_r.is_empty()
    }

    /// Number of continuous ranges currently stored.
    pub fn range_count(&self) -> usize {
        self.continuous.len()
    }

    /// Register the breaks of `invariance` that touch `filter`.
    pub fn add_curve(&mut self, curve: CurveId, invariance: &Invariance, filter: Interval) {
        for volatility in volatilities(invariance, filter) {
            match volatility {
                Volatility::Range(range) => self.add_range(range, curve),
                Volatility::Instant(t) => insert_at(&mut self.oneshot, t, curve),
                Volatility::LeftClosed(t) => insert_at(&mut self.oneshot_l, t, curve),
                Volatility::RightClosed(t) => insert_at(&mut self.oneshot_r, t, curve),
            }
        }
    }

    /// Mirror of `add_curve` with the same arguments.
    pub fn remove_curve(&mut self, curve: CurveId, invariance: &Invariance, filter: Interval) {
        for volatility in volatilities(invariance, filter) {
            match volatility {
                Volatility::Range(range) => self.remove_range(range, curve),
                Volatility::Instant(t) => remove_at(&mut self.oneshot, t, curve),
                Volatility::LeftClosed(t) => remove_at(&mut self.oneshot_l, t, curve),
                Volatility::RightClosed(t) => remove_at(&mut self.oneshot_r, t, curve),
            }
        }
    }

    /// Replace the curve's volatility around `changed`. `sub` must describe the
    /// curve's invariance over at least `changed` grown to `old`'s region bounds.
    /// Returns the curve's updated invariance.
    pub fn modify_curve(
        &mut self,
        curve: CurveId,
        changed: Interval,
        sub: &Invariance,
        old: &Invariance,
    ) -> Invariance {
        let aligned = old.expand_interval_by_alignment(changed);
        let mut new = old.clone();
        new.modify(aligned, sub);
        self.remove_curve(curve, old, aligned);
        self.add_curve(curve, &new, aligned);
        new
    }

    /// Curves whose output may differ somewhere between `t0` and `t1`.
    pub fn get_vary_curves(&self, t0: Time, t1: Time) -> CurveSet {
        let mut out = CurveSet::new();
        if t0 == t1 {
            return out;
        }
        let (a, b) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        let span = Interval::closed(a, b);
        for key in self.overlapping_keys(&span) {
            if let Some((_, set)) = self.continuous.get(&key) {
                out.extend(set.iter().copied());
            }
        }
        for set in self.oneshot.range(a..=b).map(|(_, s)| s) {
            out.extend(set.iter().copied());
        }
        for set in self.oneshot_l.range(a..b).map(|(_, s)| s) {
            out.extend(set.iter().copied());
        }
        for set in self
            .oneshot_r
            .range((Excluded(a), Included(b)))
            .map(|(_, s)| s)
        {
            out.extend(set.iter().copied());
        }
        out
    }

    /// Mark `range` volatile for `curve`, carving overlapping entries at the
    /// range bounds and filling whatever was not covered yet.
    fn add_range(&mut self, range: Interval, curve: CurveId) {
        let mut uncovered = vec![range];
        for key in self.overlapping_keys(&range) {
            let Some((entry, set)) = self.continuous.remove(&key) else {
                continue;
            };
            self.put(entry.get_intersection(&range.get_precedings()), set.clone());
            self.put(entry.get_intersection(&range.get_followings()), set.clone());
            let mut inside = set;
            inside.insert(curve);
            self.put(entry.get_intersection(&range), inside);
            uncovered = uncovered
                .iter()
                .flat_map(|piece| piece.get_difference(&entry))
                .collect();
        }
        for piece in uncovered {
            self.put(piece, CurveSet::from_iter([curve]));
        }
    }

    fn remove_range(&mut self, range: Interval, curve: CurveId) {
        for key in self.overlapping_keys(&range) {
            if !self
                .continuous
                .get(&key)
                .is_some_and(|(_, set)| set.contains(&curve))
            {
                continue;
            }
            let Some((entry, set)) = self.continuous.remove(&key) else {
                continue;
            };
            self.put(entry.get_intersection(&range.get_precedings()), set.clone());
            self.put(entry.get_intersection(&range.get_followings()), set.clone());
            let mut inside = set;
            inside.remove(&curve);
            if !inside.is_empty() {
                self.put(entry.get_intersection(&range), inside);
            }
        }

        // carve residues of this range may sit in the closed oneshot map
        let residues: Vec<Time> = self
            .oneshot
            .range(range.lower()..=range.upper())
            .filter(|(t, set)| range.includes_time(**t) && set.contains(&curve))
            .map(|(t, _)| *t)
            .collect();
        for t in residues {
            remove_at(&mut self.oneshot, t, curve);
        }

        if self.coalesce {
            self.coalesce_around(range);
        }
    }

    /// Store a carved piece: proper pieces stay continuous, single points move to
    /// the closed oneshot map, empty pieces vanish.
    fn put(&mut self, piece: Interval, set: CurveSet) {
        if set.is_empty() {
            return;
        }
        if piece.is_proper() {
            self.continuous.insert(piece.lower(), (piece, set));
        } else if piece.is_single() {
            self.oneshot.entry(piece.lower()).or_default().extend(set);
        }
    }

    /// Keys of continuous entries intersecting `range`.
    fn overlapping_keys(&self, range: &Interval) -> Vec<Time> {
        if range.is_empty() {
            return Vec::new();
        }
        let mut keys = Vec::new();
        if let Some((key, (entry, _))) = self.continuous.range(..range.lower()).next_back() {
            if !entry.get_intersection(range).is_empty() {
                keys.push(*key);
            }
        }
        keys.extend(
            self.continuous
                .range(range.lower()..=range.upper())
                .filter(|(_, (entry, _))| !entry.get_intersection(range).is_empty())
                .map(|(key, _)| *key),
        );
        keys
    }

    /// Merge touching continuous entries with equal curve sets near `range`, and
    /// absorb closed instants with the same set sitting on an open bound.
    fn coalesce_around(&mut self, range: Interval) {
        if range.is_empty() {
            return;
        }
        let lo = self
            .continuous
            .range(..range.lower())
            .next_back()
            .map_or(range.lower(), |(k, _)| *k);
        let hi = self
            .continuous
            .range((Excluded(range.upper()), Unbounded))
            .next()
            .map_or(range.upper(), |(k, _)| *k);
        let keys: Vec<Time> = self.continuous.range(lo..=hi).map(|(k, _)| *k).collect();

        for key in &keys {
            self.absorb_instants(*key);
        }
        let mut keys = keys.into_iter();
        let Some(mut current) = keys.next() else {
            return;
        };
        for next in keys {
            if !self.join(current, next) {
                current = next;
            }
        }
    }

    fn absorb_instants(&mut self, key: Time) {
        let Some((entry, set)) = self.continuous.get(&key) else {
            return;
        };
        let mut grown = *entry;
        if entry.is_lower_open() && self.oneshot.get(&entry.lower()) == Some(set) {
            self.oneshot.remove(&entry.lower());
            grown = Interval::new(grown.lower(), grown.upper(), false, grown.is_upper_open());
        }
        if entry.is_upper_open() && self.oneshot.get(&entry.upper()) == Some(set) {
            self.oneshot.remove(&entry.upper());
            grown = Interval::new(grown.lower(), grown.upper(), grown.is_lower_open(), false);
        }
        if let Some((entry, _)) = self.continuous.get_mut(&key) {
            *entry = grown;
        }
    }

    /// Join the entry at `right` into the entry at `left` when they meet with the
    /// same curve set. Returns whether they were joined.
    fn join(&mut self, left: Time, right: Time) -> bool {
        let (Some((l, ls)), Some((r, rs))) = (self.continuous.get(&left), self.continuous.get(&right))
        else {
            return false;
        };
        if l.upper() != r.lower() || ls != rs {
            return false;
        }
        let t = l.upper();
        if l.is_upper_open() && r.is_lower_open() {
            if self.oneshot.get(&t) != Some(ls) {
                return false;
            }
            self.oneshot.remove(&t);
        }
        let joined = Interval::new(l.lower(), r.upper(), l.is_lower_open(), r.is_upper_open());
        self.continuous.remove(&right);
        if let Some((entry, _)) = self.continuous.get_mut(&left) {
            *entry = joined;
        }
        true
    }
}

fn insert_at(map: &mut BTreeMap<Time, CurveSet>, t: Time, curve: CurveId) {
    map.entry(t).or_default().insert(curve);
}

fn remove_at(map: &mut BTreeMap<Time, CurveSet>, t: Time, curve: CurveId) {
    if let Some(set) = map.get_mut(&t) {
        set.remove(&curve);
        if set.is_empty() {
            map.remove(&t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(regions: &[Interval]) -> Invariance {
        let mut inv = Invariance::new();
        for r in regions {
            inv.write(*r);
        }
        inv
    }

    fn t(v: f64) -> Time {
        Time::new(v)
    }

    fn ramp() -> Invariance {
        inv(&[
            Interval::new(Time::MIN, t(0.0), false, false),
            Interval::new(t(10.0), Time::MAX, false, false),
        ])
    }

    fn steps() -> Invariance {
        inv(&[
            Interval::new(Time::MIN, t(10.0), false, true),
            Interval::new(t(10.0), t(20.0), false, true),
            Interval::new(t(20.0), Time::MAX, false, false),
        ])
    }

    #[test]
    fn break_kinds() {
        assert_eq!(
            volatilities(&ramp(), Interval::UNIVERSAL),
            vec![Volatility::Range(Interval::open(0.0, 10.0))]
        );
        assert_eq!(
            volatilities(&steps(), Interval::UNIVERSAL),
            vec![Volatility::RightClosed(t(10.0)), Volatility::RightClosed(t(20.0))]
        );
        let held = inv(&[
            Interval::new(Time::MIN, t(1.0), false, false),
            Interval::new(t(1.0), Time::MAX, true, false),
        ]);
        assert_eq!(
            volatilities(&held, Interval::UNIVERSAL),
            vec![Volatility::LeftClosed(t(1.0))]
        );
        let hole = inv(&[
            Interval::new(Time::MIN, t(1.0), false, true),
            Interval::new(t(1.0), Time::MAX, true, false),
        ]);
        assert_eq!(
            volatilities(&hole, Interval::UNIVERSAL),
            vec![Volatility::Instant(t(1.0))]
        );
        assert_eq!(
            volatilities(&Invariance::new(), Interval::UNIVERSAL),
            vec![Volatility::Range(Interval::UNIVERSAL)]
        );
        assert!(volatilities(&Invariance::universal(), Interval::UNIVERSAL).is_empty());
        assert!(volatilities(&steps(), Interval::closed(12.0, 15.0)).is_empty());
    }

    #[test]
    fn continuous_query() {
        let mut vary = VaryCurves::new(true);
        let c = CurveId(1);
        vary.add_curve(c, &ramp(), Interval::UNIVERSAL);
        assert!(vary.get_vary_curves(t(0.0), t(0.0)).is_empty());
        assert!(vary.get_vary_curves(t(0.0), t(5.0)).contains(&c));
        assert!(vary.get_vary_curves(t(5.0), t(0.0)).contains(&c));
        assert!(vary.get_vary_curves(t(10.0), t(15.0)).is_empty());
        assert!(vary.get_vary_curves(t(-5.0), t(0.0)).is_empty());
        assert!(vary.get_vary_curves(t(-5.0), t(20.0)).contains(&c));
    }

    #[test]
    fn switch_direction_matters() {
        let mut vary = VaryCurves::new(true);
        let c = CurveId(2);
        vary.add_curve(c, &steps(), Interval::UNIVERSAL);
        assert!(vary.get_vary_curves(t(5.0), t(10.0)).contains(&c));
        assert!(vary.get_vary_curves(t(10.0), t(15.0)).is_empty());
        assert!(vary.get_vary_curves(t(15.0), t(10.0)).is_empty());
        assert!(vary.get_vary_curves(t(9.0), t(9.5)).is_empty());
        assert!(vary.get_vary_curves(t(19.0), t(25.0)).contains(&c));
    }

    #[test]
    fn overlapping_ranges_split_and_rejoin() {
        let mut vary = VaryCurves::new(true);
        let a = CurveId(1);
        let b = CurveId(2);
        let wide = inv(&[
            Interval::new(Time::MIN, t(0.0), false, false),
            Interval::new(t(10.0), Time::MAX, false, false),
        ]);
        let narrow = inv(&[
            Interval::new(Time::MIN, t(4.0), false, false),
            Interval::new(t(6.0), Time::MAX, false, false),
        ]);
        vary.add_curve(a, &wide, Interval::UNIVERSAL);
        vary.add_curve(b, &narrow, Interval::UNIVERSAL);
        assert_eq!(vary.range_count(), 3);

        let mid = vary.get_vary_curves(t(4.5), t(5.5));
        assert!(mid.contains(&a) && mid.contains(&b));
        let left = vary.get_vary_curves(t(1.0), t(2.0));
        assert!(left.contains(&a) && !left.contains(&b));

        vary.remove_curve(b, &narrow, Interval::UNIVERSAL);
        assert_eq!(vary.range_count(), 1);
        let mid = vary.get_vary_curves(t(4.5), t(5.5));
        assert!(mid.contains(&a) && !mid.contains(&b));

        vary.remove_curve(a, &wide, Interval::UNIVERSAL);
        assert!(vary.is_empty());
    }

    #[test]
    fn single_point_residues_are_kept() {
        let mut vary = VaryCurves::new(false);
        let a = CurveId(1);
        let b = CurveId(2);
        // a volatile on [0, 10], b on (0, 10]
        let closed = inv(&[
            Interval::new(Time::MIN, t(0.0), false, true),
            Interval::new(t(10.0), Time::MAX, true, false),
        ]);
        vary.add_curve(a, &closed, Interval::UNIVERSAL);
        vary.add_curve(b, &ramp(), Interval::UNIVERSAL);
        let at_zero = vary.get_vary_curves(t(-1.0), t(0.0));
        assert!(at_zero.contains(&a) && !at_zero.contains(&b));

        vary.remove_curve(b, &ramp(), Interval::UNIVERSAL);
        assert!(vary.get_vary_curves(t(-1.0), t(0.0)).contains(&a));
        vary.remove_curve(a, &closed, Interval::UNIVERSAL);
        assert!(vary.is_empty());
    }

    #[test]
    fn modify_replaces_only_the_aligned_part() {
        let mut vary = VaryCurves::new(true);
        let c = CurveId(3);
        let old = steps();
        vary.add_curve(c, &old, Interval::UNIVERSAL);

        // the middle region stops being constant
        let changed = Interval::new(t(10.0), t(20.0), false, true);
        let sub = Invariance::new();
        let new = vary.modify_curve(c, changed, &sub, &old);
        assert_eq!(new.len(), 2);
        assert!(vary.get_vary_curves(t(12.0), t(15.0)).contains(&c));
        assert!(vary.get_vary_curves(t(1.0), t(5.0)).is_empty());
        assert!(vary.get_vary_curves(t(21.0), t(25.0)).is_empty());

        // and back again
        let restored = vary.modify_curve(c, changed, &steps(), &new);
        assert_eq!(restored, steps());
        assert!(vary.get_vary_curves(t(12.0), t(15.0)).is_empty());
        assert!(vary.get_vary_curves(t(5.0), t(10.0)).contains(&c));

        vary.remove_curve(c, &restored, Interval::UNIVERSAL);
        assert!(vary.is_empty());
    }
}
