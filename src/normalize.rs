//! Normalisation of intensities to a colour index.

use crate::forecast::{NoData, TimeSeriesWindow};
use crate::scale::rescale_clamped;

/// Highest colour index.
pub const MAX_COLOR_INDEX: u8 = u8::MAX;

/// Index used when every retained sample has the same intensity.
pub const FLAT_RANGE_INDEX: u8 = 128;

/// Minimum and maximum intensity of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationRange {
    pub min: i32,
    pub max: i32,
}

impl NormalizationRange {
    /// Range over every retained sample, including any that start before now.
    pub fn of(window: &TimeSeriesWindow) -> Result<Self, NoData> {
        window
            .samples()
            .fold(None, |acc: Option<Self>, s| {
                Some(match acc {
                    None => Self {
                        min: s.intensity,
                        max: s.intensity,
                    },
                    Some(r) => Self {
                        min: r.min.min(s.intensity),
                        max: r.max.max(s.intensity),
                    },
                })
            })
            .ok_or(NoData)
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.min == self.max
    }

    /// Rescale `value` from `[min, max]` onto `[0, 255]`, clamped.
    ///
    /// A flat range maps every value to [`FLAT_RANGE_INDEX`].
    pub fn color_index(&self, value: i32) -> u8 {
        rescale_clamped(
            i64::from(value),
            i64::from(self.min),
            i64::from(self.max),
            0,
            i64::from(MAX_COLOR_INDEX),
        )
        .map_or(FLAT_RANGE_INDEX, |index| index as u8)
    }
}
