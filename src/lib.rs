use chrono::{DateTime, Utc};

pub mod config;
pub mod cycle;
pub mod forecast;
pub mod gradient;
pub mod interpolation;
pub mod normalize;
pub mod ring;
pub mod scale;
pub mod schedule;

/// Trait for fetching the forward-looking intensity forecast.
///
/// Abstracts over the HTTPS client (ESP32) and fixture/synthetic
/// sources, providing a uniform interface for [`cycle::ForecastRing::refresh`].
pub trait ForecastSource {
    /// Error type for fetch or decode failures.
    type Error: std::fmt::Debug + std::fmt::Display;

    /// Fetch the forecast records starting at `now`, in the order the
    /// upstream service returned them.
    fn fetch(&mut self, now: DateTime<Utc>) -> Result<Vec<forecast::ForecastRecord>, Self::Error>;
}

/// Trait for reading the current wall-clock time.
pub trait WallClock {
    /// Current time, or `None` when the clock has not been synchronised yet.
    fn now(&mut self) -> Option<DateTime<Utc>>;
}

/// Trait for pushing a rendered ring to the light elements.
///
/// Abstracts over the WS2812 ring (ESP32) and terminal rendering.
/// Mirrors [`ForecastSource`] on the output side of the refresh loop.
pub trait RingDisplay {
    /// Error type for display update failures.
    type Error: std::fmt::Debug + std::fmt::Display;

    /// Assign every pixel of `frame` and commit it in one go.
    fn show(&mut self, frame: &ring::RingFrame) -> Result<(), Self::Error>;
}

#[cfg(target_os = "espidf")]
pub mod esp32;

#[cfg(not(target_os = "espidf"))]
pub mod mock;
