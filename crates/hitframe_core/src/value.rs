//! Animatable value types
//!
//! A property track stores exactly one [`ValueKind`], fixed when the track is
//! created. Blending and spline evaluation are implemented once per variant
//! and dispatched with a single `match`.

use crate::vec2::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of value a property track holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Float,
    Int,
    Vec2,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::Vec2 => "vec2",
        };
        f.write_str(name)
    }
}

/// A keyframeable property value
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
}

impl Value {
    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::Vec2(_) => ValueKind::Vec2,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    /// Linearly interpolate between self and other by factor t.
    ///
    /// Integers blend in floating point and round to the nearest integer.
    /// Values of different kinds do not blend; `self` is returned unchanged.
    pub fn lerp(&self, other: &Value, t: f32) -> Value {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => Value::Float(a + (b - a) * t),
            (Value::Int(a), Value::Int(b)) => {
                let (a, b) = (*a as f32, *b as f32);
                Value::Int((a + (b - a) * t).round() as i32)
            }
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(a.lerp(*b, t)),
            _ => *self,
        }
    }

    /// Evaluate a uniform Catmull-Rom spline through `points` at `t`.
    ///
    /// `t` is measured in control-point indices, so `t == i as f32` lands
    /// exactly on `points[i]`; it is clamped to `[0, len - 1]`. The end
    /// segments reuse the boundary point as their outer tangent control.
    ///
    /// Returns `None` when `points` is empty or mixes kinds.
    pub fn catmull_rom(points: &[Value], t: f32) -> Option<Value> {
        let first = points.first()?;
        let kind = first.kind();
        if points.iter().any(|p| p.kind() != kind) {
            return None;
        }
        if points.len() == 1 {
            return Some(*first);
        }

        let last = points.len() - 1;
        let t = t.clamp(0.0, last as f32);
        let segment = (t.floor() as usize).min(last - 1);
        let u = t - segment as f32;

        let p0 = points[segment.saturating_sub(1)];
        let p1 = points[segment];
        let p2 = points[segment + 1];
        let p3 = points[(segment + 2).min(last)];

        let value = match (p0, p1, p2, p3) {
            (Value::Float(a), Value::Float(b), Value::Float(c), Value::Float(d)) => {
                Value::Float(catmull_rom_scalar(a, b, c, d, u))
            }
            (Value::Int(a), Value::Int(b), Value::Int(c), Value::Int(d)) => {
                let v = catmull_rom_scalar(a as f32, b as f32, c as f32, d as f32, u);
                Value::Int(v.round() as i32)
            }
            (Value::Vec2(a), Value::Vec2(b), Value::Vec2(c), Value::Vec2(d)) => {
                Value::Vec2(Vec2::new(
                    catmull_rom_scalar(a.x, b.x, c.x, d.x, u),
                    catmull_rom_scalar(a.y, b.y, c.y, d.y, u),
                ))
            }
            _ => return None,
        };
        Some(value)
    }
}

/// Uniform Catmull-Rom between p1 and p2 at local parameter u in [0, 1]
#[inline]
fn catmull_rom_scalar(p0: f32, p1: f32, p2: f32, p3: f32, u: f32) -> f32 {
    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * u3)
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Vec2(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Vec2(v) => write!(f, "{v}"),
        }
    }
}
