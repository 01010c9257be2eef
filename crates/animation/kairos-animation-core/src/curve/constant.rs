//! A curve whose value never depends on time.

use kairos_api_core::Value;

use crate::error::{AnimationError, Result};
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

#[derive(Clone, Debug)]
pub struct ConstantCurve {
    ty: Type,
    value: Value,
}

impl ConstantCurve {
    /// `value` defaults to the type's default value.
    pub fn new(ty: &Type, value: Option<Value>) -> Result<Self> {
        let value = value.unwrap_or_else(|| ty.default_value());
        if !ty.accepts(&value) {
            return Err(AnimationError::type_mismatch(ty, format!("{:?}", value.kind())));
        }
        Ok(Self {
            ty: ty.clone(),
            value,
        })
    }

    pub fn value_type(&self) -> &Type {
        &self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_type_supported(&self, ty: &Type) -> bool {
        ty.is_convertible(&self.ty)
    }

    pub fn get_value(&self, _time: Time, ty: &Type) -> Value {
        ty.convert_value(&self.ty, &self.value)
    }

    pub fn get_invariance(&self, _interval: Interval) -> Invariance {
        Invariance::universal()
    }

    /// Returns the changed interval, `None` when the value is equal to the current one.
    pub(crate) fn set_constant_value(&mut self, value: Value) -> Result<Option<Interval>> {
        if !self.ty.accepts(&value) {
            return Err(AnimationError::type_mismatch(
                &self.ty,
                format!("{:?}", value.kind()),
            ));
        }
        if value == self.value {
            return Ok(None);
        }
        self.value = value;
        Ok(Some(Interval::UNIVERSAL))
    }
}
