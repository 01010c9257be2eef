//! Keyframed curve holding each keyframe's value until the next keyframe.

use kairos_api_core::Value;

use crate::curve::keyframes::{span, FrameChange, KeyFrame, KeyFrames};
use crate::error::Result;
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

#[derive(Clone, Debug)]
pub struct StepCurve {
    ty: Type,
    frames: KeyFrames,
}

impl StepCurve {
    /// Any type works. Without frames the curve holds the type's default value.
    pub fn new(ty: &Type, frames: Option<&[KeyFrame]>) -> Result<Self> {
        let frames = match frames {
            Some(frames) => KeyFrames::new(ty, frames, 1)?,
            None => KeyFrames::evenly_spaced(vec![ty.default_value()]),
        };
        Ok(Self {
            ty: ty.clone(),
            frames,
        })
    }

    pub fn value_type(&self) -> &Type {
        &self.ty
    }

    pub fn key_frames(&self) -> Vec<KeyFrame> {
        self.frames.to_vec()
    }

    pub fn is_type_supported(&self, ty: &Type) -> bool {
        ty.is_convertible(&self.ty)
    }

    pub fn get_value(&self, time: Time, ty: &Type) -> Value {
        let index = self.frames.search(time).saturating_sub(1);
        ty.convert_value(&self.ty, self.frames.value(index))
    }

    pub fn get_invariance(&self, interval: Interval) -> Invariance {
        let mut inv = Invariance::new();
        if interval.is_empty() {
            return inv;
        }
        let first = self.region_index(interval.lower());
        let last = self.region_index(interval.upper());
        for index in first..=last {
            inv.write(self.region(index));
        }
        inv
    }

    pub(crate) fn set_key_frames(&mut self, frames: &[KeyFrame]) -> Result<Option<Interval>> {
        let next = KeyFrames::new(&self.ty, frames, 1)?;
        let changed = match self.frames.compare(&next) {
            FrameChange::Unchanged => None,
            FrameChange::Values { first, last } => Some(span(self.region(first), self.region(last))),
            FrameChange::Restructured => Some(Interval::UNIVERSAL),
        };
        self.frames = next;
        Ok(changed)
    }

    /// Index of the region (= keyframe whose value is shown) containing `t`.
    fn region_index(&self, t: Time) -> usize {
        self.frames.search(t).max(1) - 1
    }

    /// Where keyframe `index`'s value is the output: from its time up to the next
    /// keyframe, stretched to the timeline ends for the first and last frames.
    fn region(&self, index: usize) -> Interval {
        let n = self.frames.len();
        let lower = if index == 0 {
            Time::MIN
        } else {
            self.frames.time(index)
        };
        if index + 1 >= n {
            Interval::new(lower, Time::MAX, false, false)
        } else {
            Interval::new(lower, self.frames.time(index + 1), false, true)
        }
    }
}
