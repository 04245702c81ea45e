//! Presentation rounding
//!
//! Intermediate values stay unrounded through chained conversions; these
//! helpers are only applied at the boundary (diffs, rounded recipes, the C ABI
//! display helpers). Halves round away from zero, which for the non-negative
//! quantities handled here is round-half-up.

/// Round to `decimals` places, halves away from zero
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    // The 1e-9 nudge keeps values like 2.675 (stored as 2.67499..) rounding up
    let scaled = value * scale;
    (scaled + scaled.signum() * 1e-9).round() / scale
}

/// Weights: one decimal place
#[inline]
pub fn round_weight(grams: f64) -> f64 {
    round_to(grams, 1)
}

/// Temperatures: whole degrees
#[inline]
pub fn round_temperature(celsius: f64) -> f64 {
    round_to(celsius, 0)
}

/// Times: whole units (minutes or hours)
#[inline]
pub fn round_time(value: f64) -> f64 {
    round_to(value, 0)
}
