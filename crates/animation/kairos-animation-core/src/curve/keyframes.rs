//! Keyframe storage and search shared by the step, linear and slerp curves.

use kairos_api_core::Value;

use crate::error::{AnimationError, Result};
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

/// A (time, value) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFrame {
    pub time: Time,
    pub value: Value,
}

impl KeyFrame {
    pub fn new(time: impl Into<Time>, value: Value) -> Self {
        Self {
            time: time.into(),
            value,
        }
    }
}

/// Smallest index whose keyframe time is strictly after `t`
/// (`times.len()` when there is none). O(log n).
#[inline]
pub fn search_key_frame(times: &[Time], t: Time) -> usize {
    times.partition_point(|k| *k <= t)
}

/// How a keyframe replacement differs from the frames it replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameChange {
    /// Same times, same values.
    Unchanged,
    /// Same times; values differ between these indices (inclusive).
    Values { first: usize, last: usize },
    /// Times differ; nothing can be said about where the output changed.
    Restructured,
}

/// Where a query time falls relative to the keyframes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Bracket {
    /// Outside the keyframe range or exactly on the last frame.
    Hold(usize),
    /// Between `from` and `from + 1`, `alpha` in `[0, 1)`.
    Between { from: usize, alpha: f64 },
}

/// Sorted keyframes stored as parallel time/value columns.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct KeyFrames {
    times: Vec<Time>,
    values: Vec<Value>,
}

impl KeyFrames {
    /// Validate `frames` against `ty` and `min_len`. Times must strictly increase.
    pub(crate) fn new(ty: &Type, frames: &[KeyFrame], min_len: usize) -> Result<Self> {
        if frames.len() < min_len {
            return Err(AnimationError::invalid_key_frames(format!(
                "need at least {min_len} key frames, got {}",
                frames.len()
            )));
        }
        for pair in frames.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(AnimationError::invalid_key_frames(format!(
                    "times must strictly increase ({} then {})",
                    pair[0].time, pair[1].time
                )));
            }
        }
        if let Some(bad) = frames.iter().find(|f| !ty.accepts(&f.value)) {
            return Err(AnimationError::type_mismatch(
                ty,
                format!("{:?}", bad.value.kind()),
            ));
        }
        Ok(Self {
            times: frames.iter().map(|f| f.time).collect(),
            values: frames.iter().map(|f| f.value.clone()).collect(),
        })
    }

    /// `values.len()` frames at times 0, 1, 2, ...
    pub(crate) fn evenly_spaced(values: Vec<Value>) -> Self {
        Self {
            times: (0..values.len()).map(|i| Time::new(i as f64)).collect(),
            values,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub(crate) fn time(&self, index: usize) -> Time {
        self.times[index]
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    #[inline]
    pub(crate) fn search(&self, t: Time) -> usize {
        search_key_frame(&self.times, t)
    }

    pub(crate) fn bracket(&self, t: Time) -> Bracket {
        let next = self.search(t);
        if next == 0 {
            return Bracket::Hold(0);
        }
        if next >= self.len() {
            return Bracket::Hold(self.len() - 1);
        }
        let t0 = self.times[next - 1].as_f64();
        let t1 = self.times[next].as_f64();
        Bracket::Between {
            from: next - 1,
            alpha: (t.as_f64() - t0) / (t1 - t0),
        }
    }

    pub(crate) fn to_vec(&self) -> Vec<KeyFrame> {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(t, v)| KeyFrame {
                time: *t,
                value: v.clone(),
            })
            .collect()
    }

    pub(crate) fn compare(&self, next: &KeyFrames) -> FrameChange {
        if self.times != next.times {
            return FrameChange::Restructured;
        }
        let mut differing = self
            .values
            .iter()
            .zip(&next.values)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i);
        match differing.next() {
            None => FrameChange::Unchanged,
            Some(first) => FrameChange::Values {
                first,
                last: differing.last().unwrap_or(first),
            },
        }
    }

    /// Interpolating curves hold the first value up to and including the first
    /// time, and the last value from the last time on; in between they vary.
    pub(crate) fn clamped_invariance(&self, interval: Interval) -> Invariance {
        let mut inv = Invariance::new();
        let (Some(first), Some(last)) = (self.times.first(), self.times.last()) else {
            return inv;
        };
        let inner = Interval::open(*first, *last);
        for region in [inner.get_precedings(), inner.get_followings()] {
            if !region.get_intersection(&interval).is_empty() {
                inv.write(region);
            }
        }
        inv
    }

    /// Times whose interpolated output depends on frame `index`: everything
    /// strictly between its neighbours, reaching the timeline ends at the edges.
    pub(crate) fn interpolation_influence(&self, index: usize) -> Interval {
        let n = self.len();
        let (lower, l_open) = if index == 0 {
            (Time::MIN, false)
        } else {
            (self.times[index - 1], true)
        };
        let (upper, u_open) = if index + 1 >= n {
            (Time::MAX, false)
        } else {
            (self.times[index + 1], true)
        };
        Interval::new(lower, upper, l_open, u_open)
    }
}

/// Smallest interval covering `a` followed by `b`.
pub(crate) fn span(a: Interval, b: Interval) -> Interval {
    Interval::new(a.lower(), b.upper(), a.is_lower_open(), b.is_upper_open())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(pairs: &[(f64, f64)]) -> Vec<KeyFrame> {
        pairs
            .iter()
            .map(|(t, v)| KeyFrame::new(*t, Value::Number(*v)))
            .collect()
    }

    #[test]
    fn search_returns_first_strictly_after() {
        let times: Vec<Time> = [0.0, 1.0, 2.0].iter().map(|t| Time::new(*t)).collect();
        assert_eq!(search_key_frame(&times, Time::new(-1.0)), 0);
        assert_eq!(search_key_frame(&times, Time::new(0.0)), 1);
        assert_eq!(search_key_frame(&times, Time::new(1.5)), 2);
        assert_eq!(search_key_frame(&times, Time::new(2.0)), 3);
        assert_eq!(search_key_frame(&times, Time::new(9.0)), 3);
    }

    #[test]
    fn bracket_clamps_outside_range() {
        let kf = KeyFrames::new(&Type::number(), &frames(&[(0.0, 0.0), (4.0, 1.0)]), 2).unwrap();
        assert_eq!(kf.bracket(Time::new(-1.0)), Bracket::Hold(0));
        assert_eq!(kf.bracket(Time::new(1.0)), Bracket::Between { from: 0, alpha: 0.25 });
        assert_eq!(kf.bracket(Time::new(4.0)), Bracket::Hold(1));
    }

    #[test]
    fn validation_rules() {
        let ty = Type::number();
        assert!(KeyFrames::new(&ty, &frames(&[(0.0, 1.0)]), 2).is_err());
        assert!(KeyFrames::new(&ty, &frames(&[(1.0, 1.0), (1.0, 2.0)]), 1).is_err());
        assert!(KeyFrames::new(&ty, &frames(&[(1.0, 1.0), (0.0, 2.0)]), 1).is_err());
        let bad = vec![KeyFrame::new(0.0, Value::Bool(true))];
        assert!(matches!(
            KeyFrames::new(&ty, &bad, 1),
            Err(AnimationError::TypeMismatch { .. })
        ));
        assert!(KeyFrames::new(&ty, &frames(&[(0.0, 1.0), (2.0, 2.0)]), 2).is_ok());
    }

    #[test]
    fn compare_finds_changed_value_span() {
        let ty = Type::number();
        let a = KeyFrames::new(&ty, &frames(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]), 1).unwrap();
        let same = a.clone();
        let b = KeyFrames::new(&ty, &frames(&[(0.0, 1.0), (1.0, 5.0), (2.0, 6.0)]), 1).unwrap();
        let c = KeyFrames::new(&ty, &frames(&[(0.0, 1.0), (1.5, 2.0), (2.0, 3.0)]), 1).unwrap();
        assert_eq!(a.compare(&same), FrameChange::Unchanged);
        assert_eq!(a.compare(&b), FrameChange::Values { first: 1, last: 2 });
        assert_eq!(a.compare(&c), FrameChange::Restructured);
    }

    #[test]
    fn influence_reaches_timeline_ends_at_edges() {
        let ty = Type::number();
        let kf = KeyFrames::new(&ty, &frames(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]), 1).unwrap();
        assert_eq!(
            kf.interpolation_influence(0),
            Interval::new(Time::MIN, Time::new(1.0), false, true)
        );
        assert_eq!(kf.interpolation_influence(1), Interval::open(0.0, 2.0));
        assert_eq!(
            kf.interpolation_influence(2),
            Interval::new(Time::new(1.0), Time::MAX, true, false)
        );
    }
}
