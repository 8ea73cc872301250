//! Green → white → red colour ramp indexed by normalised intensity.

use std::sync::OnceLock;

use smart_leds::RGB8;

use crate::scale::rescale;

/// Number of entries in the ramp, one per colour index.
pub const GRADIENT_LEN: usize = 256;

/// First index of the white → red half.
const RED_HALF_START: u8 = 128;

static SHARED: OnceLock<ColorGradient> = OnceLock::new();

/// Precomputed 256-entry colour lookup table.
///
/// Low indices are green, the middle is white and high indices are red.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGradient {
    table: [RGB8; GRADIENT_LEN],
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorGradient {
    pub fn new() -> Self {
        let mut table = [RGB8::default(); GRADIENT_LEN];
        for (index, entry) in table.iter_mut().enumerate() {
            *entry = ramp(index as u8);
        }
        Self { table }
    }

    /// Process-wide table, built on first use and immutable afterwards.
    pub fn shared() -> &'static ColorGradient {
        SHARED.get_or_init(ColorGradient::new)
    }

    #[inline]
    pub fn color_at(&self, index: u8) -> RGB8 {
        self.table[usize::from(index)]
    }

    pub fn as_slice(&self) -> &[RGB8] {
        &self.table
    }
}

fn ramp(index: u8) -> RGB8 {
    if index < RED_HALF_START {
        let rb = channel(index, 0, RED_HALF_START - 1, 0, 255);
        RGB8 { r: rb, g: 255, b: rb }
    } else {
        let gb = channel(index, RED_HALF_START, u8::MAX, 255, 0);
        RGB8 { r: 255, g: gb, b: gb }
    }
}

fn channel(index: u8, in_min: u8, in_max: u8, out_min: u8, out_max: u8) -> u8 {
    rescale(
        i64::from(index),
        i64::from(in_min),
        i64::from(in_max),
        i64::from(out_min),
        i64::from(out_max),
    )
    .map_or(out_min, |v| v.clamp(0, 255) as u8)
}
