//! Numeric helpers centralizing meter clamping and safe casts.

use num_traits::cast::cast;

use crate::constants::{METER_MAX, METER_MIN};

/// Clamp a meter value into `[0, 100]`, mapping non-finite values to the floor.
#[must_use]
pub fn clamp_meter(value: f32) -> f32 {
    if value.is_nan() {
        return METER_MIN;
    }
    value.clamp(METER_MIN, METER_MAX)
}

/// Express `value` as a percentage of `max`, returning 0.0 for a degenerate max.
#[must_use]
pub fn percent_of(value: f32, max: f32) -> f32 {
    if max <= 0.0 || !max.is_finite() {
        return 0.0;
    }
    clamp_meter(value / max * 100.0)
}

/// Round a ratio in `[0, 1]` to a whole percentage.
#[must_use]
pub fn ratio_to_percent(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let num = cast::<usize, f64>(numerator).unwrap_or(0.0);
    let den = cast::<usize, f64>(denominator).unwrap_or(1.0);
    let pct = (num / den * 100.0).round().clamp(0.0, 100.0);
    cast::<f64, u8>(pct).unwrap_or(0)
}

/// Sanitize a frame delta: negative or non-finite deltas collapse to zero.
#[must_use]
pub fn sanitize_delta(delta_secs: f32) -> f32 {
    if delta_secs.is_finite() && delta_secs > 0.0 {
        delta_secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_meter_handles_bounds_and_nan() {
        assert!((clamp_meter(-4.0) - 0.0).abs() < f32::EPSILON);
        assert!((clamp_meter(140.0) - 100.0).abs() < f32::EPSILON);
        assert!((clamp_meter(f32::NAN) - 0.0).abs() < f32::EPSILON);
        assert!((clamp_meter(f32::INFINITY) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ratio_rounds_and_guards_zero() {
        assert_eq!(ratio_to_percent(3, 8), 38);
        assert_eq!(ratio_to_percent(8, 8), 100);
        assert_eq!(ratio_to_percent(1, 0), 0);
    }

    #[test]
    fn delta_sanitizer_drops_bad_frames() {
        assert!((sanitize_delta(-0.5) - 0.0).abs() < f32::EPSILON);
        assert!((sanitize_delta(f32::NAN) - 0.0).abs() < f32::EPSILON);
        assert!((sanitize_delta(0.016) - 0.016).abs() < f32::EPSILON);
    }

    #[test]
    fn percent_of_guards_degenerate_max() {
        assert!((percent_of(50.0, 0.0) - 0.0).abs() < f32::EPSILON);
        assert!((percent_of(50.0, 200.0) - 25.0).abs() < f32::EPSILON);
    }
}
