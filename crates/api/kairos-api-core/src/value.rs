//! Value: runtime instances carried between curves and parameter setters.
//! All numeric types use f64 so globe-scale coordinates survive interpolation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lightweight kind enum used for quick dispatch and type checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Number,
    Text,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl ValueKind {
    /// Number of f64 components for numeric kinds, `None` for bool/text.
    pub fn dimension(self) -> Option<usize> {
        match self {
            ValueKind::Number => Some(1),
            ValueKind::Vec2 => Some(2),
            ValueKind::Vec3 => Some(3),
            ValueKind::Vec4 => Some(4),
            ValueKind::Mat4 => Some(16),
            ValueKind::Bool | ValueKind::Text => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Boolean (step only)
    Bool(bool),

    /// Scalar number
    Number(f64),

    /// Text / string; step only
    Text(String),

    /// 2D vector
    Vec2([f64; 2]),

    /// 3D vector
    Vec3([f64; 3]),

    /// 4D vector, also used for quaternions (x, y, z, w)
    Vec4([f64; 4]),

    /// 4x4 matrix, column-major
    Mat4([f64; 16]),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("{kind:?} expects {expected} components, got {actual}")]
    ComponentCount {
        kind: ValueKind,
        expected: usize,
        actual: usize,
    },
    #[error("{0:?} values have no numeric components")]
    NotNumeric(ValueKind),
}

pub const IDENTITY_MAT4: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Mat4(_) => ValueKind::Mat4,
        }
    }

    /// Zero value of a kind: false, 0, "", zero vectors and the identity matrix.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Number => Value::Number(0.0),
            ValueKind::Text => Value::Text(String::new()),
            ValueKind::Vec2 => Value::Vec2([0.0; 2]),
            ValueKind::Vec3 => Value::Vec3([0.0; 3]),
            ValueKind::Vec4 => Value::Vec4([0.0; 4]),
            ValueKind::Mat4 => Value::Mat4(IDENTITY_MAT4),
        }
    }

    /// Convenience constructors
    pub fn number(v: f64) -> Self {
        Value::Number(v)
    }

    pub fn vec2(x: f64, y: f64) -> Self {
        Value::Vec2([x, y])
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn vec4(x: f64, y: f64, z: f64, w: f64) -> Self {
        Value::Vec4([x, y, z, w])
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric components of number/vector/matrix values.
    pub fn components(&self) -> Option<&[f64]> {
        match self {
            Value::Number(v) => Some(std::slice::from_ref(v)),
            Value::Vec2(a) => Some(a),
            Value::Vec3(a) => Some(a),
            Value::Vec4(a) => Some(a),
            Value::Mat4(a) => Some(a),
            Value::Bool(_) | Value::Text(_) => None,
        }
    }

    /// Assemble a numeric value of `kind` from its components.
    pub fn from_components(kind: ValueKind, comps: &[f64]) -> Result<Self, ValueError> {
        let expected = kind.dimension().ok_or(ValueError::NotNumeric(kind))?;
        if comps.len() != expected {
            return Err(ValueError::ComponentCount {
                kind,
                expected,
                actual: comps.len(),
            });
        }
        Ok(match kind {
            ValueKind::Number => Value::Number(comps[0]),
            ValueKind::Vec2 => Value::Vec2([comps[0], comps[1]]),
            ValueKind::Vec3 => Value::Vec3([comps[0], comps[1], comps[2]]),
            ValueKind::Vec4 => Value::Vec4([comps[0], comps[1], comps[2], comps[3]]),
            ValueKind::Mat4 => {
                let mut m = [0.0; 16];
                m.copy_from_slice(comps);
                Value::Mat4(m)
            }
            ValueKind::Bool | ValueKind::Text => unreachable!("dimension() is None"),
        })
    }
}
