//! Resolve an arbitrary instant to an intensity from the forecast window.

use chrono::{DateTime, Utc};

use crate::forecast::{Bracket, NoData, TimeSeriesWindow};

/// Intensity at `t`.
///
/// Before the first sample or at/after the last one, the boundary sample's
/// intensity is held. In between, the two adjacent samples are linearly
/// interpolated on their start times with truncating integer division:
/// `i0 + (i1 - i0) * (t - t0) / (t1 - t0)`.
pub fn intensity_at(window: &TimeSeriesWindow, t: DateTime<Utc>) -> Result<i32, NoData> {
    let intensity = match window.bracket(t)? {
        Bracket::Before(first) => first.intensity,
        Bracket::After(last) => last.intensity,
        Bracket::Between { lower, upper } => lerp_truncating(
            lower.start.timestamp(),
            lower.intensity,
            upper.start.timestamp(),
            upper.intensity,
            t.timestamp(),
        ),
    };
    Ok(intensity)
}

/// Integer linear interpolation between `(t0, i0)` and `(t1, i1)`.
///
/// `t` must satisfy `t0 <= t < t1`, so the result lies between `i0` and `i1`.
fn lerp_truncating(t0: i64, i0: i32, t1: i64, i1: i32, t: i64) -> i32 {
    let span = i128::from(t1) - i128::from(t0);
    let elapsed = i128::from(t) - i128::from(t0);
    let rise = i128::from(i1) - i128::from(i0);
    let value = i128::from(i0) + rise * elapsed / span;
    // i0 <= value <= i1 (or reversed), so this never saturates in practice
    value.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::Sample;
    use chrono::{Duration, TimeZone};
    use test_case::test_case;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 29, 12, 0, 0).unwrap()
    }

    fn window(points: &[(i64, i32)]) -> TimeSeriesWindow {
        let samples = points.iter().map(|&(secs, intensity)| {
            let start = t0() + Duration::seconds(secs);
            Sample::new(start, start + Duration::minutes(30), intensity)
        });
        TimeSeriesWindow::build(t0(), Duration::hours(12), samples)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    #[test]
    fn holds_first_value_before_data() {
        let w = window(&[(1800, 80), (3600, 120)]);
        assert_eq!(intensity_at(&w, at(0)), Ok(80));
        assert_eq!(intensity_at(&w, at(-86_400)), Ok(80));
        assert_eq!(intensity_at(&w, at(1800)), Ok(80));
    }

    #[test]
    fn holds_last_value_after_data() {
        let w = window(&[(0, 80), (1800, 120)]);
        assert_eq!(intensity_at(&w, at(1800)), Ok(120));
        assert_eq!(intensity_at(&w, at(40_000)), Ok(120));
    }

    // 100 -> 50 over 1800s
    #[test_case(0, 100 ; "at lower sample")]
    #[test_case(900, 75 ; "midpoint")]
    #[test_case(1, 100 ; "truncates -0.027 toward zero")]
    #[test_case(37, 99 ; "truncates -1.027 toward zero")]
    #[test_case(1799, 51 ; "truncates -49.97 toward zero")]
    fn falling_pair_truncates(secs: i64, expected: i32) {
        let w = window(&[(0, 100), (1800, 50)]);
        assert_eq!(intensity_at(&w, at(secs)), Ok(expected));
    }

    // 7 -> 10 over 1800s
    #[test_case(599, 7 ; "just below one step")]
    #[test_case(600, 8 ; "exactly one step")]
    #[test_case(1799, 9 ; "just below upper")]
    fn rising_pair_truncates(secs: i64, expected: i32) {
        let w = window(&[(0, 7), (1800, 10)]);
        assert_eq!(intensity_at(&w, at(secs)), Ok(expected));
    }

    #[test]
    fn monotonic_between_samples() {
        let rising = window(&[(0, 40), (1800, 260)]);
        let falling = window(&[(0, 260), (1800, 40)]);
        let mut prev_up = i32::MIN;
        let mut prev_down = i32::MAX;
        for secs in (0..=1800).step_by(13) {
            let up = intensity_at(&rising, at(secs)).unwrap();
            let down = intensity_at(&falling, at(secs)).unwrap();
            assert!(up >= prev_up, "rising pair decreased at {secs}s");
            assert!(down <= prev_down, "falling pair increased at {secs}s");
            prev_up = up;
            prev_down = down;
        }
    }

    #[test]
    fn large_gaps_and_intensities_do_not_overflow() {
        let w = window(&[(-400_000_000, i32::MIN), (40_000, i32::MAX)]);
        let v = intensity_at(&w, at(0)).unwrap();
        assert!(v > i32::MIN && v < i32::MAX);
    }

    #[test]
    fn empty_window_is_no_data() {
        let w = window(&[]);
        assert_eq!(intensity_at(&w, t0()), Err(NoData));
    }
}
