use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::Sample;

/// The window holds no samples, so there is nothing to look up or scale.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("forecast window holds no samples")]
pub struct NoData;

/// Adjacent sample(s) surrounding a queried instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket<'a> {
    /// The instant precedes the earliest sample's start.
    Before(&'a Sample),
    /// The instant is at or beyond the latest sample's start.
    After(&'a Sample),
    /// `lower.start <= t < upper.start`, with the two samples adjacent.
    Between { lower: &'a Sample, upper: &'a Sample },
}

/// Samples for one refresh cycle, keyed and ordered by start time.
///
/// Built from scratch every cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSeriesWindow {
    samples: BTreeMap<DateTime<Utc>, Sample>,
}

impl TimeSeriesWindow {
    /// Retain samples whose start lies within `horizon` of `now`.
    ///
    /// `samples` is expected in ascending start order: iteration stops at
    /// the first sample starting after `now + horizon`, so anything after it
    /// is dropped even if it would have been in range. A later sample with
    /// the same start time replaces an earlier one.
    pub fn build(
        now: DateTime<Utc>,
        horizon: Duration,
        samples: impl IntoIterator<Item = Sample>,
    ) -> Self {
        let cutoff = now.checked_add_signed(horizon).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut retained = BTreeMap::new();
        for sample in samples {
            if sample.start > cutoff {
                log::debug!("forecast horizon reached at {}", sample.start);
                break;
            }
            retained.insert(sample.start, sample);
        }
        Self { samples: retained }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retained samples in ascending start order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.values()
    }

    #[inline]
    pub fn first(&self) -> Option<&Sample> {
        self.samples.values().next()
    }

    #[inline]
    pub fn last(&self) -> Option<&Sample> {
        self.samples.values().next_back()
    }

    /// Find the sample(s) surrounding `t`.
    pub fn bracket(&self, t: DateTime<Utc>) -> Result<Bracket<'_>, NoData> {
        let lower = self.samples.range(..=t).next_back().map(|(_, s)| s);
        let upper = self.samples.range((Excluded(t), Unbounded)).next().map(|(_, s)| s);

        match (lower, upper) {
            (Some(lower), Some(upper)) => Ok(Bracket::Between { lower, upper }),
            (Some(last), None) => Ok(Bracket::After(last)),
            (None, Some(first)) => Ok(Bracket::Before(first)),
            (None, None) => Err(NoData),
        }
    }
}
