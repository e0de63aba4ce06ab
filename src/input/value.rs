//! Normalization and shaping of raw axis samples.

use serde::{Deserialize, Serialize};

use crate::input::capability::DeadzonePoint;

/// The raw integer range a physical axis is observed or configured to
/// produce. Only meaningful for normalization when `minimum < maximum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRange {
    pub minimum: i32,
    pub maximum: i32,
}

impl InputRange {
    pub fn new(minimum: i32, maximum: i32) -> Self {
        Self { minimum, maximum }
    }
}

impl Default for InputRange {
    /// The full unsigned 16-bit range most drivers report.
    fn default() -> Self {
        Self {
            minimum: 0,
            maximum: u16::MAX as i32,
        }
    }
}

/// Normalize a raw sample into `[0, 1]` against the given range. An
/// inverted or empty range fails closed to 0.0 so a miscalibrated axis
/// reads as no input rather than garbage.
pub fn normalize(raw: i32, range: InputRange) -> f32 {
    if range.minimum >= range.maximum {
        return 0.0;
    }
    let t = (raw as f64 - range.minimum as f64) / (range.maximum as f64 - range.minimum as f64);
    t as f32
}

/// Apply a deadzone to a normalized `[0, 1]` value.
///
/// `End` treats the dead band as the physical end-stops: values within
/// `deadzone` of either end clamp to that end, the rest rescales so the
/// full output range stays reachable. `Mid` snaps a band around center to
/// exactly 0.5 and rescales the remainder from the band edge, preserving
/// sign, so the first value outside the band starts just off center.
pub fn apply_deadzone(t: f32, deadzone: f32, point: DeadzonePoint) -> f32 {
    let deadzone = deadzone.clamp(0.0, 1.0);
    if deadzone == 0.0 || point == DeadzonePoint::None {
        return t;
    }

    // Work in [-1, 1] so both policies share the same remap. `scale` is
    // zero only for a degenerate full-range deadzone, where every branch
    // below avoids the division.
    let v = 2.0 * t - 1.0;
    let scale = 1.0 - deadzone;
    let v = match point {
        DeadzonePoint::End => {
            if v.abs() > scale {
                v.signum()
            } else if scale <= 0.0 {
                0.0
            } else {
                v / scale
            }
        }
        DeadzonePoint::Mid => {
            if v.abs() < deadzone || scale <= 0.0 {
                0.0
            } else {
                v.signum() * ((v.abs() - deadzone) / scale)
            }
        }
        DeadzonePoint::None => v,
    };
    (v + 1.0) / 2.0
}

/// Blend between linear and cubic response: `f(x) = c·x³ + (1-c)·x`.
///
/// Centered outputs get the curve applied to the distance from center with
/// the sign restored afterwards, so the shaping cannot distort the zero
/// crossing.
pub fn apply_curve(t: f32, curve: f32, point: DeadzonePoint) -> f32 {
    if curve == 0.0 {
        return t;
    }
    let curve = curve.clamp(0.0, 1.0);

    match point {
        DeadzonePoint::Mid => {
            let v = 2.0 * t - 1.0;
            let shaped = curve * v.abs().powi(3) + (1.0 - curve) * v.abs();
            (v.signum() * shaped + 1.0) / 2.0
        }
        DeadzonePoint::End | DeadzonePoint::None => curve * t.powi(3) + (1.0 - curve) * t,
    }
}
