//! Maps the forecast window onto the LED ring.
//!
//! The ring is a 12-hour clock face: position `i` stands for the `i`-th
//! slice of the cycle. The LED under the current time is painted with a
//! fixed marker colour, and each following LED shows the forecast for the
//! moment it represents, wrapping around the face.

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use smart_leds::RGB8;

use crate::config::{ConfigError, RingConfig};
use crate::forecast::{NoData, TimeSeriesWindow};
use crate::gradient::ColorGradient;
use crate::interpolation::intensity_at;
use crate::normalize::NormalizationRange;
use crate::scale::rescale_clamped;

/// Colour of the LED under the current time.
pub const NOW_MARKER: RGB8 = RGB8 { r: 0, g: 0, b: 255 };

/// Every pixel assignment of one render, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingFrame {
    now_index: usize,
    assignments: Vec<(usize, RGB8)>,
}

impl RingFrame {
    /// Ring position of the current time.
    #[inline]
    pub fn now_index(&self) -> usize {
        self.now_index
    }

    /// `(led_index, color)` pairs: the marker first, then the forecast
    /// going forward in time.
    #[inline]
    pub fn assignments(&self) -> &[(usize, RGB8)] {
        &self.assignments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Colour assigned to `led_index`, if it is on the ring.
    pub fn color_at(&self, led_index: usize) -> Option<RGB8> {
        self.assignments
            .iter()
            .find(|(index, _)| *index == led_index)
            .map(|(_, color)| *color)
    }

    /// Colours ordered by LED index, ready for a strip driver.
    pub fn pixels(&self) -> Vec<RGB8> {
        let mut pixels = vec![RGB8::default(); self.assignments.len()];
        for &(index, color) in &self.assignments {
            pixels[index] = color;
        }
        pixels
    }
}

/// Renders a forecast window onto a ring of fixed size.
#[derive(Debug, Clone)]
pub struct RingRenderer {
    led_count: usize,
    cycle_secs: i64,
    seconds_per_led: i64,
    local_offset: FixedOffset,
    gradient: &'static ColorGradient,
}

impl RingRenderer {
    pub fn new(config: &RingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset_secs = config.local_offset_secs();
        let local_offset = i32::try_from(offset_secs)
            .ok()
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::UtcOffsetOutOfRange { secs: offset_secs })?;
        Ok(Self {
            led_count: config.led_count,
            cycle_secs: config.cycle_secs(),
            seconds_per_led: config.seconds_per_led(),
            local_offset,
            gradient: ColorGradient::shared(),
        })
    }

    #[inline]
    pub fn led_count(&self) -> usize {
        self.led_count
    }

    #[inline]
    pub fn seconds_per_led(&self) -> i64 {
        self.seconds_per_led
    }

    /// Ring position of `now`: local time of day, modulo the cycle, scaled
    /// onto `[0, led_count - 1]`.
    pub fn now_index(&self, now: DateTime<Utc>) -> usize {
        let local = now.with_timezone(&self.local_offset);
        let secs_into_cycle =
            i64::from(local.num_seconds_from_midnight()).rem_euclid(self.cycle_secs);
        let last = self.led_count as i64 - 1;
        rescale_clamped(secs_into_cycle, 0, self.cycle_secs, 0, last).unwrap_or(0) as usize
    }

    /// Instant represented by the LED `offset` steps ahead of now.
    fn led_time(&self, now: DateTime<Utc>, offset: usize) -> DateTime<Utc> {
        let secs = self.seconds_per_led.saturating_mul(offset as i64);
        Duration::try_seconds(secs)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Colour every LED for the cycle starting at `now`.
    pub fn render(
        &self,
        window: &TimeSeriesWindow,
        range: &NormalizationRange,
        now: DateTime<Utc>,
    ) -> Result<RingFrame, NoData> {
        if window.is_empty() {
            return Err(NoData);
        }

        let now_index = self.now_index(now);
        let mut assignments = Vec::with_capacity(self.led_count);
        assignments.push((now_index, NOW_MARKER));

        for offset in 1..self.led_count {
            let intensity = intensity_at(window, self.led_time(now, offset))?;
            let color = self.gradient.color_at(range.color_index(intensity));
            assignments.push(((now_index + offset) % self.led_count, color));
        }

        Ok(RingFrame {
            now_index,
            assignments,
        })
    }

    /// [`render`](Self::render) with the range taken from `window` itself.
    pub fn render_window(
        &self,
        window: &TimeSeriesWindow,
        now: DateTime<Utc>,
    ) -> Result<RingFrame, NoData> {
        let range = NormalizationRange::of(window)?;
        log::debug!(
            "rendering {} samples, intensity range {}..={}",
            window.len(),
            range.min,
            range.max
        );
        self.render(window, &range, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::Sample;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use test_case::test_case;

    const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
    const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

    fn renderer(led_count: usize) -> RingRenderer {
        RingRenderer::new(&RingConfig::with_led_count(led_count)).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 29, h, m, s).unwrap()
    }

    fn window(now: DateTime<Utc>, points: &[(i64, i32)]) -> TimeSeriesWindow {
        let samples = points.iter().map(|&(mins, intensity)| {
            let start = now + Duration::minutes(mins);
            Sample::new(start, start + Duration::minutes(30), intensity)
        });
        TimeSeriesWindow::build(now, Duration::hours(12), samples)
    }

    #[test_case(at(0, 0, 0), 0 ; "midnight")]
    #[test_case(at(12, 0, 0), 0 ; "noon wraps")]
    #[test_case(at(3, 0, 0), 24 ; "three oclock truncates 24.75")]
    #[test_case(at(6, 0, 0), 49 ; "six oclock truncates 49.5")]
    #[test_case(at(23, 59, 59), 98 ; "last second of cycle")]
    fn now_index_on_hundred_led_ring(now: DateTime<Utc>, expected: usize) {
        assert_eq!(renderer(100).now_index(now), expected);
    }

    #[test]
    fn now_index_uses_local_offset() {
        let config = RingConfig {
            utc_offset_secs: 3 * 3600,
            ..RingConfig::with_led_count(100)
        };
        let r = RingRenderer::new(&config).unwrap();
        assert_eq!(r.now_index(at(0, 0, 0)), 24);
    }

    #[test]
    fn now_index_adds_daylight_saving() {
        let config = RingConfig {
            utc_offset_secs: 2 * 3600,
            dst_offset_secs: 3600,
            ..RingConfig::with_led_count(100)
        };
        let r = RingRenderer::new(&config).unwrap();
        assert_eq!(r.now_index(at(0, 0, 0)), 24);
    }

    #[test]
    fn concrete_four_led_scenario() {
        let now = at(0, 0, 0);
        let w = window(now, &[(0, 50), (180, 100), (540, 50)]);
        let r = renderer(4);
        assert_eq!(r.seconds_per_led(), 3 * 3600);

        let frame = r.render_window(&w, now).unwrap();

        assert_eq!(frame.now_index(), 0);
        assert_eq!(frame.color_at(0), Some(NOW_MARKER));
        // T0+3h lands exactly on the 100 sample
        assert_eq!(frame.color_at(1), Some(RED));
        // T0+6h interpolates 100 -> 50 to 75, colour index 127
        assert_eq!(frame.color_at(2), Some(RGB8 { r: 255, g: 255, b: 255 }));
        // T0+9h lands exactly on the 50 sample
        assert_eq!(frame.color_at(3), Some(GREEN));
    }

    #[test]
    fn ring_covers_every_position_once() {
        let now = at(7, 13, 0);
        let w = window(now, &[(-30, 180), (0, 200), (30, 150), (90, 90), (400, 260)]);
        let r = renderer(100);

        let frame = r.render_window(&w, now).unwrap();

        assert_eq!(frame.len(), 100);
        let positions: HashSet<usize> = frame.assignments().iter().map(|(i, _)| *i).collect();
        assert_eq!(positions, (0..100).collect());
        assert_eq!(frame.assignments()[0], (frame.now_index(), NOW_MARKER));
        assert_eq!(frame.pixels()[frame.now_index()], NOW_MARKER);
    }

    #[test]
    fn past_extreme_widens_range_for_future_leds() {
        let now = at(0, 0, 0);
        let future_only = window(now, &[(0, 50), (180, 100)]);
        let with_past = window(now, &[(-30, 200), (0, 50), (180, 100)]);
        let r = renderer(4);

        let narrow = r.render_window(&future_only, now).unwrap();
        let wide = r.render_window(&with_past, now).unwrap();

        // T0+3h reads 100 in both; only the -30min sample moves the range max
        assert_eq!(narrow.color_at(1), Some(RED));
        // 100 within 50..=200 -> 50 * 255 / 150 = 85
        let expected = ColorGradient::shared().color_at(85);
        assert_eq!(wide.color_at(1), Some(expected));
        assert_eq!(expected, RGB8 { r: 170, g: 255, b: 170 });
    }

    #[test]
    fn forecast_wraps_around_past_the_top() {
        // 11:00 on a 4-LED ring is index 2, so offsets 2 and 3 wrap to 0 and 1
        let now = at(11, 0, 0);
        let w = window(now, &[(0, 10), (180, 20)]);

        let frame = renderer(4).render_window(&w, now).unwrap();

        let order: Vec<usize> = frame.assignments().iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![2, 3, 0, 1]);
        assert_eq!(frame.color_at(3), Some(RED));
    }

    #[test]
    fn marker_overrides_data_at_now() {
        let now = at(0, 0, 0);
        let w = window(now, &[(0, 300), (60, 10)]);

        let frame = renderer(12).render_window(&w, now).unwrap();

        assert_eq!(frame.color_at(frame.now_index()), Some(NOW_MARKER));
    }

    #[test]
    fn flat_forecast_renders_mid_colour() {
        let now = at(0, 0, 0);
        let w = window(now, &[(0, 40), (30, 40), (60, 40)]);
        let mid = ColorGradient::shared().color_at(128);

        let frame = renderer(8).render_window(&w, now).unwrap();

        for &(index, color) in frame.assignments() {
            if index != frame.now_index() {
                assert_eq!(color, mid);
            }
        }
    }

    #[test]
    fn single_led_ring_is_just_the_marker() {
        let now = at(5, 0, 0);
        let w = window(now, &[(0, 40)]);

        let frame = renderer(1).render_window(&w, now).unwrap();

        assert_eq!(frame.assignments(), &[(0, NOW_MARKER)]);
    }

    #[test]
    fn empty_window_is_no_data() {
        let now = at(0, 0, 0);
        let w = window(now, &[]);
        let range = NormalizationRange { min: 0, max: 1 };

        assert_eq!(renderer(4).render(&w, &range, now), Err(NoData));
        assert_eq!(renderer(4).render_window(&w, now), Err(NoData));
    }

    #[test]
    fn far_future_now_does_not_overflow() {
        let now = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let w = window(now, &[(0, 10)]);

        let frame = renderer(100).render_window(&w, now).unwrap();

        assert_eq!(frame.len(), 100);
    }

    #[test]
    fn longest_cycle_renders_without_panicking() {
        let now = at(0, 0, 0);
        let config = RingConfig {
            cycle: std::time::Duration::from_secs(chrono::TimeDelta::MAX.num_seconds() as u64),
            ..RingConfig::with_led_count(4)
        };
        let w = window(now, &[(0, 10), (60, 20)]);

        let frame = RingRenderer::new(&config).unwrap().render_window(&w, now).unwrap();

        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn rejects_invalid_config() {
        assert_eq!(
            RingRenderer::new(&RingConfig::with_led_count(0)).unwrap_err(),
            ConfigError::NoLeds
        );
    }
}
