//! Blending utilities for Value types.
//! - f64 linear interpolation for numbers, vector and matrix components
//! - quaternion slerp (shortest-arc) on [x, y, z, w] tuples
//! - left-hold for Bool/Text

use crate::Value;

/// Linear interpolation for f64
#[inline]
pub fn lerp_f(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Lerp for fixed-size arrays
fn lerp_array<const N: usize>(a: &[f64; N], b: &[f64; N], t: f64) -> [f64; N] {
    let mut out = [0.0f64; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

#[inline]
fn dot4(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion represented as [x,y,z,w]
fn normalize_quat(q: [f64; 4]) -> [f64; 4] {
    let mag = dot4(&q, &q).sqrt();
    if mag == 0.0 {
        [0.0, 0.0, 0.0, 1.0]
    } else {
        [q[0] / mag, q[1] / mag, q[2] / mag, q[3] / mag]
    }
}

/// Spherical interpolation between two quaternions along the shortest arc.
pub fn slerp_quat(q1: [f64; 4], q2: [f64; 4], t: f64) -> [f64; 4] {
    let qa = normalize_quat(q1);
    let mut qb = normalize_quat(q2);

    let mut dot = dot4(&qa, &qb);

    // Negative dot means the long way round; flip one side.
    if dot < 0.0 {
        qb = [-qb[0], -qb[1], -qb[2], -qb[3]];
        dot = -dot;
    }

    // Nearly parallel: sin(theta) is too small to divide by.
    const DOT_THRESHOLD: f64 = 0.9995;
    if dot > DOT_THRESHOLD {
        return normalize_quat(lerp_array(&qa, &qb, t));
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    [
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ]
}

/// Linear interpolation across Value kinds.
/// Bool/Text (and mismatched kinds) hold the left value.
pub fn lerp_value(a: &Value, b: &Value, t: f64) -> Value {
    match (a, b) {
        (Value::Number(va), Value::Number(vb)) => Value::Number(lerp_f(*va, *vb, t)),
        (Value::Vec2(va), Value::Vec2(vb)) => Value::Vec2(lerp_array(va, vb, t)),
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_array(va, vb, t)),
        (Value::Vec4(va), Value::Vec4(vb)) => Value::Vec4(lerp_array(va, vb, t)),
        (Value::Mat4(ma), Value::Mat4(mb)) => Value::Mat4(lerp_array(ma, mb, t)),
        _ => a.clone(),
    }
}
