//! Tunable constants of the ring and the forecast API.

use std::time::Duration;

use thiserror::Error;

/// Number of LEDs on the stock ring.
pub const DEFAULT_LED_COUNT: usize = 100;

/// One revolution of the ring: a 12-hour clock face.
pub const DEFAULT_CYCLE: Duration = Duration::from_secs(12 * 60 * 60);

/// Period between forecast refreshes.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30 * 60);

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Longest cycle whose span still fits a calendar duration.
const MAX_CYCLE_SECS: u64 = chrono::TimeDelta::MAX.num_seconds() as u64;

pub const DEFAULT_API_BASE_URL: &str = "https://api.carbonintensity.org.uk";
pub const DEFAULT_POSTCODE: &str = "KT6";

/// What to do with a record whose `from`/`to` timestamp fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadTimestampPolicy {
    /// Drop the record and log it.
    Skip,
    /// Keep the record with the failed timestamp set to the Unix epoch.
    #[default]
    Epoch,
}

/// Errors from [`RingConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("LED count must be greater than zero")]
    NoLeds,
    #[error("display cycle must be at least one second")]
    CycleTooShort,
    #[error("display cycle of {cycle_secs}s is too long")]
    CycleTooLong { cycle_secs: u64 },
    #[error("{led_count} LEDs cannot share a {cycle_secs}s cycle")]
    TooManyLeds { led_count: usize, cycle_secs: u64 },
    #[error("refresh period must be greater than zero")]
    NoRefreshPeriod,
    #[error("local time offset of {secs}s is not within a day")]
    UtcOffsetOutOfRange { secs: i64 },
}

/// Ring geometry and timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingConfig {
    /// Number of light elements on the ring.
    pub led_count: usize,
    /// Time represented by one full revolution; also the forecast horizon.
    pub cycle: Duration,
    /// Period between forecast refreshes.
    pub refresh_period: Duration,
    /// Standard offset of local time from UTC, used to place "now" on the
    /// clock face.
    pub utc_offset_secs: i32,
    /// Extra offset while daylight saving is in effect, added on top of
    /// `utc_offset_secs`. Fixed for the lifetime of the config; there is no
    /// automatic switchover.
    pub dst_offset_secs: i32,
    pub bad_timestamps: BadTimestampPolicy,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            led_count: DEFAULT_LED_COUNT,
            cycle: DEFAULT_CYCLE,
            refresh_period: DEFAULT_REFRESH_PERIOD,
            utc_offset_secs: 0,
            dst_offset_secs: 0,
            bad_timestamps: BadTimestampPolicy::default(),
        }
    }
}

impl RingConfig {
    /// Default configuration for a ring with `led_count` LEDs.
    pub fn with_led_count(led_count: usize) -> Self {
        Self {
            led_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.led_count == 0 {
            return Err(ConfigError::NoLeds);
        }
        let cycle_secs = self.cycle.as_secs();
        if cycle_secs == 0 {
            return Err(ConfigError::CycleTooShort);
        }
        if cycle_secs > MAX_CYCLE_SECS {
            return Err(ConfigError::CycleTooLong { cycle_secs });
        }
        if self.led_count as u64 > cycle_secs {
            return Err(ConfigError::TooManyLeds {
                led_count: self.led_count,
                cycle_secs,
            });
        }
        if self.refresh_period.is_zero() {
            return Err(ConfigError::NoRefreshPeriod);
        }
        let offset = self.local_offset_secs();
        if offset.unsigned_abs() >= u64::from(SECONDS_PER_DAY) {
            return Err(ConfigError::UtcOffsetOutOfRange { secs: offset });
        }
        Ok(())
    }

    /// Total offset of local time from UTC, daylight saving included.
    #[inline]
    pub fn local_offset_secs(&self) -> i64 {
        i64::from(self.utc_offset_secs) + i64::from(self.dst_offset_secs)
    }

    /// Whole seconds of the cycle.
    #[inline]
    pub fn cycle_secs(&self) -> i64 {
        i64::try_from(self.cycle.as_secs()).unwrap_or(i64::MAX)
    }

    /// Seconds covered by each LED, truncated.
    #[inline]
    pub fn seconds_per_led(&self) -> i64 {
        self.cycle_secs() / self.led_count.max(1) as i64
    }

    /// The forecast horizon as a signed calendar duration.
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.cycle_secs()).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Where to fetch the forecast from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub postcode: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            postcode: DEFAULT_POSTCODE.to_string(),
        }
    }
}
