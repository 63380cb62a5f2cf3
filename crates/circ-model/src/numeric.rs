//! Shared numeric policy for every ledger computation.
//!
//! # Precision
//!
//! All quantities, values and prices are `f64` rounded to [`PRECISION`]
//! decimal places (the 1e-6 scale used for money throughout the workspace).
//! Rounding happens at the ledger boundary so that two runs fed the same
//! opening state produce bit-identical results.
//!
//! # Tolerance
//!
//! A single [`EPSILON`] governs every threshold and equality comparison.
//! Comparisons scale the tolerance by magnitude once values exceed 1.0, so
//! aggregates over many rounded stocks still compare equal.

/// Decimal places kept by [`round_to_precision`].
pub const PRECISION: i32 = 6;

/// Tolerance for all threshold and equality comparisons.
pub const EPSILON: f64 = 1e-5;

/// Round to [`PRECISION`] decimal places (half away from zero).
///
/// Symmetric: `round_to_precision(-x) == -round_to_precision(x)`, which keeps
/// paired ledger deltas exactly opposite.
#[inline]
pub fn round_to_precision(x: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    (x * scale).round() / scale
}

/// `true` if `a` and `b` agree within [`EPSILON`] (relative above 1.0).
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    let magnitude = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= EPSILON * magnitude
}

/// `true` if `x` is within [`EPSILON`] of zero.
#[inline]
pub fn is_negligible(x: f64) -> bool {
    x.abs() <= EPSILON
}

/// `true` if `a` exceeds `b` by more than the tolerance.
#[inline]
pub fn exceeds(a: f64, b: f64) -> bool {
    a > b && !approx_eq(a, b)
}

/// `numerator / denominator`, or NaN when the denominator is negligible.
#[inline]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if is_negligible(denominator) {
        f64::NAN
    } else {
        numerator / denominator
    }
}
