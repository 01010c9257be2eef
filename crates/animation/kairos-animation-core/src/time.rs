//! Points on the animation timeline.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A moment in animation time. Totally ordered; `MIN`/`MAX` act as the open ends
/// of the timeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time(OrderedFloat<f64>);

impl Time {
    pub const MIN: Time = Time(OrderedFloat(f64::MIN));
    pub const MAX: Time = Time(OrderedFloat(f64::MAX));

    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(OrderedFloat(value))
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0.into_inner()
    }
}

impl From<f64> for Time {
    #[inline]
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Time> for f64 {
    #[inline]
    fn from(time: Time) -> Self {
        time.as_f64()
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Time::MIN {
            f.write_str("-inf")
        } else if *self == Time::MAX {
            f.write_str("+inf")
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}
