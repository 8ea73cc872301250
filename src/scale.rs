//! Integer linear rescaling shared by the normalizer, gradient and ring.

/// Linearly map `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Uses integer arithmetic with truncation toward zero, so the result
/// matches the classic microcontroller `map()` bit for bit:
/// `(x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min`.
/// The result is not clamped; `x` outside the input interval maps outside
/// the output interval.
///
/// Returns `None` for a zero-width input interval.
pub fn rescale(x: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> Option<i64> {
    let run = i128::from(in_max) - i128::from(in_min);
    if run == 0 {
        return None;
    }
    let rise = i128::from(out_max) - i128::from(out_min);
    let delta = i128::from(x) - i128::from(in_min);
    let mapped = delta * rise / run + i128::from(out_min);
    Some(mapped.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
}

/// [`rescale`] followed by a clamp to the output interval.
///
/// `out_min` and `out_max` may be given in either order.
pub fn rescale_clamped(
    x: i64,
    in_min: i64,
    in_max: i64,
    out_min: i64,
    out_max: i64,
) -> Option<i64> {
    let (lo, hi) = if out_min <= out_max {
        (out_min, out_max)
    } else {
        (out_max, out_min)
    };
    rescale(x, in_min, in_max, out_min, out_max).map(|v| v.clamp(lo, hi))
}
