//! Coercion helpers between Value kinds.
//! Only the boolean <-> number pair converts implicitly; everything else
//! is identity-only and handled by the caller.

use crate::Value;

/// Threshold at or above which a number reads as `true`.
pub const BOOL_THRESHOLD: f64 = 0.5;

/// Coerce a Value into a number.
/// Rules:
/// - Number -> its value
/// - Bool -> 1.0 / 0.0
/// - anything else -> `None`
pub fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Coerce a Value into a boolean.
/// Rules:
/// - Bool -> its value
/// - Number -> `n >= 0.5`
/// - anything else -> `None`
pub fn to_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(*n >= BOOL_THRESHOLD),
        _ => None,
    }
}
