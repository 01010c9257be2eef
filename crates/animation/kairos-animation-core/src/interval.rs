//! Time ranges with independently open/closed ends, and the algebra over them.
//!
//! Every operation is a closed-form comparison of boundaries. Results that are
//! sets of intervals come back time-ordered and never touching.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Time;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    lower: Time,
    upper: Time,
    l_open: bool,
    u_open: bool,
}

impl Interval {
    /// `[MIN, MAX]`, the whole timeline.
    pub const UNIVERSAL: Interval = Interval {
        lower: Time::MIN,
        upper: Time::MAX,
        l_open: false,
        u_open: false,
    };

    #[inline]
    pub const fn new(lower: Time, upper: Time, l_open: bool, u_open: bool) -> Self {
        Self {
            lower,
            upper,
            l_open,
            u_open,
        }
    }

    /// `[lower, upper]`
    pub fn closed(lower: impl Into<Time>, upper: impl Into<Time>) -> Self {
        Self::new(lower.into(), upper.into(), false, false)
    }

    /// `(lower, upper)`
    pub fn open(lower: impl Into<Time>, upper: impl Into<Time>) -> Self {
        Self::new(lower.into(), upper.into(), true, true)
    }

    /// `[t, t]`
    pub fn single(t: impl Into<Time>) -> Self {
        let t = t.into();
        Self::new(t, t, false, false)
    }

    #[inline]
    pub fn lower(&self) -> Time {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> Time {
        self.upper
    }

    #[inline]
    pub fn is_lower_open(&self) -> bool {
        self.l_open
    }

    #[inline]
    pub fn is_upper_open(&self) -> bool {
        self.u_open
    }

    pub fn is_empty(&self) -> bool {
        match self.upper.cmp(&self.lower) {
            Ordering::Less => true,
            Ordering::Equal => self.l_open || self.u_open,
            Ordering::Greater => false,
        }
    }

    pub fn is_single(&self) -> bool {
        self.lower == self.upper && !self.l_open && !self.u_open
    }

    pub fn is_proper(&self) -> bool {
        self.lower < self.upper
    }

    /// Every point of `self` lies before every point of `rhs`.
    /// Vacuously true when either side is empty.
    pub fn precedes(&self, rhs: &Interval) -> bool {
        if self.is_empty() || rhs.is_empty() {
            return true;
        }
        match self.upper.cmp(&rhs.lower) {
            Ordering::Less => true,
            Ordering::Equal => self.u_open || rhs.l_open,
            Ordering::Greater => false,
        }
    }

    /// `self ⊇ rhs`. Vacuously true when `rhs` is empty.
    pub fn includes(&self, rhs: &Interval) -> bool {
        if rhs.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        let lower_ok = match self.lower.cmp(&rhs.lower) {
            Ordering::Less => true,
            Ordering::Equal => !self.l_open || rhs.l_open,
            Ordering::Greater => false,
        };
        let upper_ok = match self.upper.cmp(&rhs.upper) {
            Ordering::Greater => true,
            Ordering::Equal => !self.u_open || rhs.u_open,
            Ordering::Less => false,
        };
        lower_ok && upper_ok
    }

    pub fn includes_time(&self, t: Time) -> bool {
        let above_lower = match self.lower.cmp(&t) {
            Ordering::Less => true,
            Ordering::Equal => !self.l_open,
            Ordering::Greater => false,
        };
        let below_upper = match t.cmp(&self.upper) {
            Ordering::Less => true,
            Ordering::Equal => !self.u_open,
            Ordering::Greater => false,
        };
        above_lower && below_upper
    }

    pub fn get_intersection(&self, rhs: &Interval) -> Interval {
        let (lower, l_open) = match self.lower.cmp(&rhs.lower) {
            Ordering::Greater => (self.lower, self.l_open),
            Ordering::Less => (rhs.lower, rhs.l_open),
            Ordering::Equal => (self.lower, self.l_open || rhs.l_open),
        };
        let (upper, u_open) = match self.upper.cmp(&rhs.upper) {
            Ordering::Less => (self.upper, self.u_open),
            Ordering::Greater => (rhs.upper, rhs.u_open),
            Ordering::Equal => (self.upper, self.u_open || rhs.u_open),
        };
        Interval::new(lower, upper, l_open, u_open)
    }

    /// Union as 0, 1 or 2 intervals. Two results are returned in time order
    /// and are separated by at least one point.
    pub fn get_union(&self, rhs: &Interval) -> Vec<Interval> {
        match (self.is_empty(), rhs.is_empty()) {
            (true, true) => return Vec::new(),
            (true, false) => return vec![*rhs],
            (false, true) => return vec![*self],
            (false, false) => {}
        }

        // `a` starts no later than `b`
        let a_first = match self.lower.cmp(&rhs.lower) {
            Ordering::Less => true,
            Ordering::Equal => !self.l_open,
            Ordering::Greater => false,
        };
        let (a, b) = if a_first { (self, rhs) } else { (rhs, self) };

        let separated = match a.upper.cmp(&b.lower) {
            Ordering::Less => true,
            Ordering::Equal => a.u_open && b.l_open,
            Ordering::Greater => false,
        };
        if separated {
            return vec![*a, *b];
        }

        let l_open = if a.lower == b.lower {
            a.l_open && b.l_open
        } else {
            a.l_open
        };
        let (upper, u_open) = match a.upper.cmp(&b.upper) {
            Ordering::Greater => (a.upper, a.u_open),
            Ordering::Less => (b.upper, b.u_open),
            Ordering::Equal => (a.upper, a.u_open && b.u_open),
        };
        vec![Interval::new(a.lower, upper, l_open, u_open)]
    }

    /// `self \ rhs` as 0, 1 or 2 intervals in time order.
    pub fn get_difference(&self, rhs: &Interval) -> Vec<Interval> {
        if self.is_empty() {
            return Vec::new();
        }
        if rhs.is_empty() {
            return vec![*self];
        }
        [
            self.get_intersection(&rhs.get_precedings()),
            self.get_intersection(&rhs.get_followings()),
        ]
        .into_iter()
        .filter(|iv| !iv.is_empty())
        .collect()
    }

    pub fn get_complement(&self) -> Vec<Interval> {
        Interval::UNIVERSAL.get_difference(self)
    }

    /// Everything strictly before `self`; UNIVERSAL when `self` is empty.
    pub fn get_precedings(&self) -> Interval {
        if self.is_empty() {
            return Interval::UNIVERSAL;
        }
        Interval::new(Time::MIN, self.lower, false, !self.l_open)
    }

    /// Everything strictly after `self`; UNIVERSAL when `self` is empty.
    pub fn get_followings(&self) -> Interval {
        if self.is_empty() {
            return Interval::UNIVERSAL;
        }
        Interval::new(self.upper, Time::MAX, !self.u_open, false)
    }

    /// Closures of `self` and `rhs` share at least one point.
    pub(crate) fn touches(&self, rhs: &Interval) -> bool {
        !self.is_empty() && !rhs.is_empty() && self.lower <= rhs.upper && rhs.lower <= self.upper
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = if self.l_open { '(' } else { '[' };
        let u = if self.u_open { ')' } else { ']' };
        write!(f, "{l}{}, {}{u}", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(v: f64) -> Time {
        Time::new(v)
    }

    #[test]
    fn emptiness_classes() {
        assert!(Interval::closed(2.0, 1.0).is_empty());
        assert!(Interval::new(t(1.0), t(1.0), true, false).is_empty());
        assert!(Interval::single(1.0).is_single());
        assert!(!Interval::single(1.0).is_proper());
        assert!(Interval::open(1.0, 2.0).is_proper());
        assert!(!Interval::open(1.0, 2.0).is_empty());
        assert!(Interval::UNIVERSAL.is_proper());
    }

    #[test]
    fn precedes_at_shared_bound() {
        let a = Interval::new(t(0.0), t(1.0), false, true);
        let b = Interval::closed(1.0, 2.0);
        assert!(a.precedes(&b));
        assert!(!Interval::closed(0.0, 1.0).precedes(&b));
        assert!(Interval::closed(0.0, 1.0).precedes(&Interval::open(1.0, 2.0)));
        assert!(Interval::closed(3.0, 2.0).precedes(&b));
    }

    #[test]
    fn includes_respects_open_ends() {
        let outer = Interval::new(t(0.0), t(5.0), true, false);
        assert!(outer.includes(&Interval::open(0.0, 5.0)));
        assert!(!outer.includes(&Interval::closed(0.0, 5.0)));
        assert!(outer.includes(&Interval::closed(1.0, 5.0)));
        assert!(outer.includes(&Interval::closed(3.0, 2.0)));
        assert!(!Interval::closed(3.0, 2.0).includes(&outer));
    }

    #[test]
    fn includes_time_boundaries() {
        let iv = Interval::new(t(0.0), t(1.0), false, true);
        assert!(iv.includes_time(t(0.0)));
        assert!(iv.includes_time(t(0.5)));
        assert!(!iv.includes_time(t(1.0)));
        assert!(!iv.includes_time(t(-0.1)));
    }

    #[test]
    fn intersection_prefers_open_at_equal_bounds() {
        let a = Interval::new(t(0.0), t(2.0), false, true);
        let b = Interval::new(t(0.0), t(2.0), true, false);
        let c = a.get_intersection(&b);
        assert_eq!(c, Interval::open(0.0, 2.0));
        assert!(Interval::closed(0.0, 1.0)
            .get_intersection(&Interval::closed(2.0, 3.0))
            .is_empty());
    }

    #[test]
    fn union_merges_touching_and_splits_separated() {
        let a = Interval::new(t(0.0), t(1.0), false, true);
        let b = Interval::closed(1.0, 2.0);
        assert_eq!(a.get_union(&b), vec![Interval::closed(0.0, 2.0)]);

        let c = Interval::open(1.0, 2.0);
        assert_eq!(a.get_union(&c), vec![a, c]);
        assert_eq!(c.get_union(&a), vec![a, c]);

        assert!(Interval::closed(1.0, 0.0)
            .get_union(&Interval::closed(3.0, 2.0))
            .is_empty());
    }

    #[test]
    fn difference_pieces() {
        let a = Interval::closed(0.0, 10.0);
        let b = Interval::open(2.0, 4.0);
        assert_eq!(
            a.get_difference(&b),
            vec![Interval::closed(0.0, 2.0), Interval::closed(4.0, 10.0)]
        );
        assert_eq!(a.get_difference(&Interval::UNIVERSAL), vec![]);
        assert_eq!(
            a.get_difference(&Interval::closed(5.0, 4.0)),
            vec![Interval::closed(0.0, 10.0)]
        );
    }

    #[test]
    fn complement_of_closed() {
        let c = Interval::closed(1.0, 2.0).get_complement();
        assert_eq!(
            c,
            vec![
                Interval::new(Time::MIN, t(1.0), false, true),
                Interval::new(t(2.0), Time::MAX, true, false),
            ]
        );
        assert_eq!(Interval::closed(1.0, 0.0).get_complement(), vec![Interval::UNIVERSAL]);
    }

    #[test]
    fn precedings_followings() {
        let iv = Interval::new(t(1.0), t(2.0), true, false);
        assert_eq!(iv.get_precedings(), Interval::closed(Time::MIN, t(1.0)));
        assert_eq!(
            iv.get_followings(),
            Interval::new(t(2.0), Time::MAX, true, false)
        );
        assert_eq!(Interval::closed(3.0, 2.0).get_precedings(), Interval::UNIVERSAL);
    }

    #[test]
    fn display_brackets() {
        assert_eq!(
            Interval::new(t(0.0), t(1.5), true, false).to_string(),
            "(0, 1.5]"
        );
        assert_eq!(Interval::UNIVERSAL.to_string(), "[-inf, +inf]");
    }
}
