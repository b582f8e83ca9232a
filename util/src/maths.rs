//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp `value` into the symmetric band `[-limit, +limit]`.
///
/// `limit` is expected to be non-negative. A limit of zero always returns
/// zero.
pub fn clamp_abs<T>(value: T, limit: T) -> T
where
    T: Float,
{
    let limit = limit.abs();

    if value > limit {
        limit
    } else if value < -limit {
        -limit
    } else {
        value
    }
}

/// Get the shortest signed angular distance from `b` to `a`.
///
/// The result is `a - b` wrapped into `(-pi, pi]`, computed as
/// `atan2(sin(a - b), cos(a - b))`.
pub fn shortest_angle_diff<T>(a: T, b: T) -> T
where
    T: Float,
{
    let d = a - b;
    let wrapped = d.sin().atan2(d.cos());

    // atan2 returns -pi for a difference of exactly -pi, map it onto the open
    // end of the range
    if wrapped <= -T::from(std::f64::consts::PI).unwrap_or_else(T::zero) {
        -wrapped
    } else {
        wrapped
    }
}

/// Median of three values.
///
/// NaN inputs are treated as larger than any number.
pub fn median3<T>(a: T, b: T, c: T) -> T
where
    T: Float,
{
    let (lo, hi) = if a <= b || b.is_nan() { (a, b) } else { (b, a) };

    if c <= lo {
        lo
    } else if c <= hi || hi.is_nan() {
        c
    } else {
        hi
    }
}
