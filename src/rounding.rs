//! Rounding with explicit decimal-place semantics.
//!
//! All three primitives work on the absolute value and reapply the sign
//! afterwards, so `round_down` truncates toward zero and `round_up` moves
//! away from zero regardless of sign. A negative `decimal_places` rounds to
//! tens, hundreds, and so on. Non-finite values yield NaN.

fn sign_and_factor(value: f64, decimal_places: i32) -> (f64, f64, f64) {
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let factor = 10f64.powf(f64::from(decimal_places));
    (sign, value.abs(), factor)
}

/// Round half away from zero at `decimal_places`.
pub fn round(value: f64, decimal_places: i32) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    let (sign, abs, factor) = sign_and_factor(value, decimal_places);
    sign * (abs * factor).round() / factor
}

/// Truncate toward zero at `decimal_places`.
pub fn round_down(value: f64, decimal_places: i32) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    let (sign, abs, factor) = sign_and_factor(value, decimal_places);
    sign * (abs * factor).floor() / factor
}

/// Round away from zero at `decimal_places`.
pub fn round_up(value: f64, decimal_places: i32) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    let (sign, abs, factor) = sign_and_factor(value, decimal_places);
    sign * (abs * factor).ceil() / factor
}

/// Threshold rounding: positive values are truncated, everything else
/// (zero, negatives, NaN) goes through [`round_up`].
///
/// Both branches move the value toward negative infinity, so a rounded
/// threshold never exceeds the computed one.
pub fn round_directional(value: f64, decimal_places: i32) -> f64 {
    if value > 0.0 {
        round_down(value, decimal_places)
    } else {
        round_up(value, decimal_places)
    }
}
