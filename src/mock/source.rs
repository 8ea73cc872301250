use std::convert::Infallible;

use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::ForecastSource;
use crate::forecast::{API_DATE_FORMAT, ForecastRecord, ForecastResponse};

/// Serves the same decoded payload on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixtureSource {
    records: Vec<ForecastRecord>,
}

impl FixtureSource {
    pub fn from_records(records: Vec<ForecastRecord>) -> Self {
        Self { records }
    }

    /// Decode a regional endpoint response body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        ForecastResponse::from_json(body).map(|r| Self::from_records(r.into_records()))
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }
}

impl ForecastSource for FixtureSource {
    type Error = Infallible;

    fn fetch(&mut self, _now: DateTime<Utc>) -> Result<Vec<ForecastRecord>, Self::Error> {
        Ok(self.records.clone())
    }
}

/// Generates a plausible 24-hour half-hourly forecast around `now`.
///
/// Intensity follows a daily swing peaking in the early evening, so the
/// whole gradient shows up on the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSource {
    pub base: i32,
    pub swing: i32,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            base: 150,
            swing: 90,
        }
    }
}

const SLOT_MINUTES: i64 = 30;
const SLOTS: i64 = 48;

impl SyntheticSource {
    fn intensity_at(&self, t: DateTime<Utc>) -> i32 {
        let day_fraction = f64::from(t.timestamp().rem_euclid(86_400) as i32) / 86_400.0;
        // peak at 18:00
        let phase = (day_fraction - 0.75) * std::f64::consts::TAU;
        self.base + (f64::from(self.swing) * phase.cos()).round() as i32
    }

    /// Records for the 24 hours from the half-hour slot containing `now`.
    pub fn records(&self, now: DateTime<Utc>) -> Vec<ForecastRecord> {
        let slot = Duration::minutes(SLOT_MINUTES);
        let first = now.duration_trunc(slot).unwrap_or(now);
        (0..SLOTS)
            .map(|i| {
                let from = first + slot * i as i32;
                let to = from + slot;
                ForecastRecord::new(
                    from.format(API_DATE_FORMAT).to_string(),
                    to.format(API_DATE_FORMAT).to_string(),
                    self.intensity_at(from),
                )
            })
            .collect()
    }
}

impl ForecastSource for SyntheticSource {
    type Error = Infallible;

    fn fetch(&mut self, now: DateTime<Utc>) -> Result<Vec<ForecastRecord>, Self::Error> {
        Ok(self.records(now))
    }
}
