//! Piecewise-linear keyframe curve over numbers and vectors.

use kairos_api_core::{lerp_value, Value};

use crate::curve::keyframes::{span, Bracket, FrameChange, KeyFrame, KeyFrames};
use crate::error::{AnimationError, Result};
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::{Type, TypeKind};

#[derive(Clone, Debug)]
pub struct LinearCurve {
    ty: Type,
    frames: KeyFrames,
}

impl LinearCurve {
    /// Without frames the curve holds the default value at times 0 and 1.
    pub fn new(ty: &Type, frames: Option<&[KeyFrame]>) -> Result<Self> {
        if !matches!(
            ty.kind(),
            TypeKind::Number | TypeKind::Vector2 | TypeKind::Vector3 | TypeKind::Vector4
        ) {
            return Err(AnimationError::type_mismatch("number or vector", ty));
        }
        let frames = match frames {
            Some(frames) => KeyFrames::new(ty, frames, 2)?,
            None => KeyFrames::evenly_spaced(vec![ty.default_value(), ty.default_value()]),
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
        let value = match self.frames.bracket(time) {
            Bracket::Hold(index) => self.frames.value(index).clone(),
            Bracket::Between { from, alpha } => {
                lerp_value(self.frames.value(from), self.frames.value(from + 1), alpha)
            }
        };
        ty.convert_value(&self.ty, &value)
    }

    pub fn get_invariance(&self, interval: Interval) -> Invariance {
        self.frames.clamped_invariance(interval)
    }

    pub(crate) fn set_key_frames(&mut self, frames: &[KeyFrame]) -> Result<Option<Interval>> {
        let next = KeyFrames::new(&self.ty, frames, 2)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> LinearCurve {
        let frames = vec![
            KeyFrame::new(0.0, Value::Number(0.0)),
            KeyFrame::new(10.0, Value::Number(100.0)),
        ];
        LinearCurve::new(&Type::number(), Some(&frames)).unwrap()
    }

    fn sample(c: &LinearCurve, t: f64) -> f64 {
        c.get_value(Time::new(t), &Type::number())
            .as_number()
            .unwrap()
    }

    #[test]
    fn interpolates_and_clamps() {
        let c = ramp();
        assert_eq!(sample(&c, 0.0), 0.0);
        assert_eq!(sample(&c, 10.0), 100.0);
        assert_relative_eq!(sample(&c, 5.0), 50.0);
        assert_relative_eq!(sample(&c, 2.5), 25.0);
        assert_eq!(sample(&c, -3.0), 0.0);
        assert_eq!(sample(&c, 30.0), 100.0);
    }

    #[test]
    fn vectors_interpolate_componentwise() {
        let frames = vec![
            KeyFrame::new(0.0, Value::vec3(0.0, 0.0, 0.0)),
            KeyFrame::new(2.0, Value::vec3(2.0, 4.0, -2.0)),
        ];
        let c = LinearCurve::new(&Type::vector3(), Some(&frames)).unwrap();
        assert_eq!(
            c.get_value(Time::new(1.0), &Type::vector3()),
            Value::vec3(1.0, 2.0, -1.0)
        );
    }

    #[test]
    fn constant_outside_keyframe_range() {
        let inv = ramp().get_invariance(Interval::UNIVERSAL);
        let regions: Vec<Interval> = inv.intervals().copied().collect();
        assert_eq!(
            regions,
            vec![
                Interval::new(Time::MIN, Time::new(0.0), false, false),
                Interval::new(Time::new(10.0), Time::MAX, false, false),
            ]
        );
        assert!(ramp().get_invariance(Interval::open(2.0, 3.0)).is_empty());
    }

    #[test]
    fn rejects_unsupported_types_and_short_frames() {
        assert!(matches!(
            LinearCurve::new(&Type::string(), None),
            Err(AnimationError::TypeMismatch { .. })
        ));
        let one = vec![KeyFrame::new(0.0, Value::Number(1.0))];
        assert!(matches!(
            LinearCurve::new(&Type::number(), Some(&one)),
            Err(AnimationError::InvalidKeyFrames { .. })
        ));
    }

    #[test]
    fn value_edit_reports_neighbour_span() {
        let mut c = ramp();
        let frames = vec![
            KeyFrame::new(0.0, Value::Number(0.0)),
            KeyFrame::new(10.0, Value::Number(50.0)),
        ];
        assert_eq!(
            c.set_key_frames(&frames).unwrap(),
            Some(Interval::new(Time::new(0.0), Time::MAX, true, false))
        );
        assert_relative_eq!(sample(&c, 5.0), 25.0);
    }
}
