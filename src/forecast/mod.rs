//! Forecast samples and the ingestion boundary for upstream records.

pub mod window;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ApiConfig, BadTimestampPolicy};

pub use window::{Bracket, NoData, TimeSeriesWindow};

/// Timestamp layout used by the forecast API, e.g. `2017-08-25T12:35Z`.
pub const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

/// One half-hourly forecast observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub intensity: i32,
}

impl Sample {
    #[inline]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>, intensity: i32) -> Self {
        Self {
            start,
            end,
            intensity,
        }
    }
}

/// Intensity block of a forecast record. Only the forecast value is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityField {
    pub forecast: i32,
}

/// One decoded record as served by the regional intensity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub from: String,
    pub to: String,
    pub intensity: IntensityField,
}

impl ForecastRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>, forecast: i32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            intensity: IntensityField { forecast },
        }
    }
}

/// `data` object of the regional endpoint; the records sit one level deeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionData {
    pub data: Vec<ForecastRecord>,
}

/// Top-level envelope of a regional forecast response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub data: RegionData,
}

impl ForecastResponse {
    /// Decode a response body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn into_records(self) -> Vec<ForecastRecord> {
        self.data.data
    }
}

/// Error when a record timestamp does not match [`API_DATE_FORMAT`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid forecast timestamp '{input}': {reason}")]
pub struct TimestampError {
    pub input: String,
    pub reason: chrono::format::ParseError,
}

/// Parse an API timestamp into an absolute UTC instant.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    NaiveDateTime::parse_from_str(input.trim(), API_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|reason| TimestampError {
            input: input.to_string(),
            reason,
        })
}

/// Result of converting upstream records into samples.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ingested {
    /// Samples in upstream order.
    pub samples: Vec<Sample>,
    /// Records dropped under [`BadTimestampPolicy::Skip`].
    pub rejected: Vec<TimestampError>,
}

/// Convert one record, resolving timestamp failures according to `policy`.
///
/// Returns `Err` only under [`BadTimestampPolicy::Skip`].
pub fn sample_from_record(
    record: &ForecastRecord,
    policy: BadTimestampPolicy,
) -> Result<Sample, TimestampError> {
    let resolve = |raw: &str| match (parse_timestamp(raw), policy) {
        (Ok(instant), _) => Ok(instant),
        (Err(e), BadTimestampPolicy::Epoch) => {
            log::warn!("{e}, using the Unix epoch");
            Ok(DateTime::UNIX_EPOCH)
        }
        (Err(e), BadTimestampPolicy::Skip) => Err(e),
    };
    let start = resolve(&record.from)?;
    let end = resolve(&record.to)?;
    Ok(Sample::new(start, end, record.intensity.forecast))
}

/// Convert upstream records into samples, preserving their order.
pub fn ingest<'a>(
    records: impl IntoIterator<Item = &'a ForecastRecord>,
    policy: BadTimestampPolicy,
) -> Ingested {
    let mut ingested = Ingested::default();
    for record in records {
        match sample_from_record(record, policy) {
            Ok(sample) => ingested.samples.push(sample),
            Err(e) => {
                log::warn!("dropping forecast record: {e}");
                ingested.rejected.push(e);
            }
        }
    }
    ingested
}

/// Build the regional forecast URL covering the 24 hours from `now`.
pub fn forecast_url(api: &ApiConfig, now: DateTime<Utc>) -> String {
    format!(
        "{}/regional/intensity/{}/fw24h/postcode/{}",
        api.base_url.trim_end_matches('/'),
        now.format(API_DATE_FORMAT),
        api.postcode.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAYLOAD: &str = r#"{
        "data": {
            "regionid": 13,
            "shortname": "London",
            "postcode": "KT6",
            "data": [
                {"from": "2025-11-29T13:00Z", "to": "2025-11-29T13:30Z",
                 "intensity": {"forecast": 65, "index": "moderate"},
                 "generationmix": []},
                {"from": "2025-11-29T13:30Z", "to": "2025-11-29T14:00Z",
                 "intensity": {"forecast": 66, "index": "moderate"},
                 "generationmix": []}
            ]
        }
    }"#;

    #[test]
    fn parse_timestamp_accepts_api_format() {
        let parsed = parse_timestamp("2025-11-29T13:30Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 11, 29, 13, 30, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
    }

    #[test]
    fn decode_response_ignores_unknown_fields() {
        let records = ForecastResponse::from_json(PAYLOAD).unwrap().into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ForecastRecord::new("2025-11-29T13:00Z", "2025-11-29T13:30Z", 65));
        assert_eq!(records[1].intensity.forecast, 66);
    }

    #[test]
    fn ingest_skip_drops_bad_records() {
        let records = vec![
            ForecastRecord::new("2025-11-29T13:00Z", "2025-11-29T13:30Z", 65),
            ForecastRecord::new("not-a-time", "2025-11-29T14:00Z", 70),
            ForecastRecord::new("2025-11-29T14:00Z", "broken", 75),
        ];

        let ingested = ingest(&records, BadTimestampPolicy::Skip);

        assert_eq!(ingested.samples.len(), 1);
        assert_eq!(ingested.samples[0].intensity, 65);
        assert_eq!(ingested.rejected.len(), 2);
        assert_eq!(ingested.rejected[0].input, "not-a-time");
        assert_eq!(ingested.rejected[1].input, "broken");
    }

    #[test]
    fn ingest_epoch_keeps_bad_records_at_epoch() {
        let records = vec![ForecastRecord::new("not-a-time", "2025-11-29T14:00Z", 70)];

        let ingested = ingest(&records, BadTimestampPolicy::Epoch);

        assert!(ingested.rejected.is_empty());
        assert_eq!(ingested.samples[0].start, DateTime::UNIX_EPOCH);
        assert_eq!(
            ingested.samples[0].end,
            Utc.with_ymd_and_hms(2025, 11, 29, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn forecast_url_formats_now_and_postcode() {
        let api = ApiConfig {
            base_url: "https://api.carbonintensity.org.uk/".to_string(),
            postcode: "KT6".to_string(),
        };
        let now = Utc.with_ymd_and_hms(2025, 11, 29, 13, 7, 42).unwrap();

        assert_eq!(
            forecast_url(&api, now),
            "https://api.carbonintensity.org.uk/regional/intensity/2025-11-29T13:07Z/fw24h/postcode/KT6"
        );
    }
}
