//! Pure conversions from raw axis samples to the values handed to the simulator.
//!
//! Two transforms exist: a symmetric response curve around the axis center for the
//! spring-loaded axes (joystick, rudder) and detent snapping for the notched levers
//! (flaps, throttle). Both depend on nothing but their inputs and the profile scalars.

use crate::profile::DetentSet;

/// Center of the spring-loaded axes.
pub const CURVE_CENTER: f64 = 0.5;
/// Snap distance of the throttle when the profile does not configure one.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.05;

/// Clamps an axis sample into `[0, 1]`, `NaN` collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Exponent and gain applied to the spring-loaded axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseCurve {
    response: f64,
    sensitivity: f64,
}

impl Default for ResponseCurve {
    fn default() -> Self { Self { response: 1.0, sensitivity: 1.0 } }
}

impl ResponseCurve {
    /// Builds a curve from the optional profile scalars.
    ///
    /// A missing, non-finite or non-positive exponent falls back to 1, a missing or
    /// non-finite sensitivity falls back to 1.
    pub fn new(response: Option<f64>, sensitivity: Option<f64>) -> Self {
        let response = response.filter(|r| r.is_finite() && *r > 0.0).unwrap_or(1.0);
        let sensitivity = sensitivity.filter(|s| s.is_finite()).unwrap_or(1.0);
        Self { response, sensitivity }
    }

    pub fn response(&self) -> f64 { self.response }
    pub fn sensitivity(&self) -> f64 { self.sensitivity }

    /// Maps a raw sample through the curve.
    ///
    /// The deflection from center is normalized to `[0, 1]`, raised to the response
    /// exponent, scaled back and finally amplified by the sensitivity. Unit exponent and
    /// unit sensitivity return the (clamped) input bit for bit.
    #[allow(clippy::float_cmp)]
    pub fn apply(&self, value: f64) -> f64 {
        let value = clamp_unit(value);
        let curved = if self.response == 1.0 {
            value
        } else {
            let delta = value - CURVE_CENTER;
            let sign = if delta >= 0.0 { 1.0 } else { -1.0 };
            let magnitude = (delta.abs() * 2.0).powf(self.response) / 2.0;
            CURVE_CENTER + sign * magnitude
        };
        if self.sensitivity == 1.0 {
            curved
        } else {
            clamp_unit(CURVE_CENTER + (curved - CURVE_CENTER) * self.sensitivity)
        }
    }
}

/// Snaps `value` to the nearest detent, unconditionally.
///
/// An empty set leaves the value untouched.
pub fn snap_to_detent(value: f64, detents: &DetentSet) -> f64 {
    let value = clamp_unit(value);
    detents.nearest(value).map_or(value, |(_, d)| d.value())
}

/// Snaps a throttle sample to the nearest detent if it lies within `threshold` of it.
///
/// Reverse mode is checked first and disables snapping outright, then samples below
/// the lowest detent bypass snapping (the idle range stays continuous).
///
/// # Arguments
/// - `value`: The raw sample, clamped into `[0, 1]`.
/// - `detents`: The profile's throttle detents.
/// - `threshold`: Maximum distance that still snaps.
/// - `reverse`: Whether reverse thrust is engaged.
///
/// # Returns
/// The detent value, or the clamped sample if no snap applies.
pub fn snap_throttle(value: f64, detents: &DetentSet, threshold: f64, reverse: bool) -> f64 {
    let value = clamp_unit(value);
    if reverse {
        return value;
    }
    let Some(min) = detents.min_value() else {
        return value;
    };
    if value < min {
        return value;
    }
    match detents.nearest(value) {
        Some((_, detent)) if (detent.value() - value).abs() <= threshold => detent.value(),
        _ => value,
    }
}

/// Ease-out cubic progress for `t` in `[0, 1]`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t).powi(3)
}
