//! Quaternion keyframe curve with shortest-arc spherical interpolation.
//!
//! Values are `vector4` tuples in `[x, y, z, w]` order.

use kairos_api_core::{slerp_quat, Value};

use crate::curve::keyframes::{span, Bracket, FrameChange, KeyFrame, KeyFrames};
use crate::error::Result;
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

const IDENTITY: Value = Value::Vec4([0.0, 0.0, 0.0, 1.0]);

#[derive(Clone, Debug)]
pub struct SlerpCurve {
    frames: KeyFrames,
}

impl SlerpCurve {
    /// Without frames the curve holds the identity rotation at times 0 and 1.
    pub fn new(frames: Option<&[KeyFrame]>) -> Result<Self> {
        let frames = match frames {
            Some(frames) => KeyFrames::new(&Type::vector4(), frames, 2)?,
            None => KeyFrames::evenly_spaced(vec![IDENTITY, IDENTITY]),
        };
        Ok(Self { frames })
    }

    pub fn key_frames(&self) -> Vec<KeyFrame> {
        self.frames.to_vec()
    }

    pub fn is_type_supported(&self, ty: &Type) -> bool {
        ty.is_convertible(&Type::vector4())
    }

    pub fn get_value(&self, time: Time, ty: &Type) -> Value {
        let value = match self.frames.bracket(time) {
            Bracket::Hold(index) => self.frames.value(index).clone(),
            Bracket::Between { from, alpha } => {
                match (self.frames.value(from), self.frames.value(from + 1)) {
                    (Value::Vec4(a), Value::Vec4(b)) => Value::Vec4(slerp_quat(*a, *b, alpha)),
                    (a, _) => a.clone(),
                }
            }
        };
        ty.convert_value(&Type::vector4(), &value)
    }

    pub fn get_invariance(&self, interval: Interval) -> Invariance {
        self.frames.clamped_invariance(interval)
    }

    pub(crate) fn set_key_frames(&mut self, frames: &[KeyFrame]) -> Result<Option<Interval>> {
        let next = KeyFrames::new(&Type::vector4(), frames, 2)?;
        let changed = match self.frames.compare(&next) {
            FrameChange::Unchanged => None,
            FrameChange::Values { first, last } => Some(span(
                self.frames.interpolation_influence(first),
                self.frames.interpolation_influence(last),
            )),
            FrameChange::Restructured => Some(Interval::UNIVERSAL),
        };
        self.frames = next;
        Ok(changed)
    }
}
