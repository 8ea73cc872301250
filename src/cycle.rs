//! One refresh cycle: fetch the forecast, render it, push it to the ring.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{ConfigError, RingConfig};
use crate::forecast::{ForecastRecord, NoData, TimeSeriesWindow, ingest};
use crate::ring::{RingFrame, RingRenderer};
use crate::{ForecastSource, RingDisplay, WallClock};

/// Why a cycle ended without touching the display.
///
/// The previously shown frame stays up in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The wall clock has no time yet.
    NoTime,
    /// Fetching or decoding the forecast failed.
    Fetch(String),
    /// No sample survived ingestion and the horizon cut.
    NoData { rejected: usize },
}

/// Result of a cycle that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The frame that was shown.
    Rendered(RingFrame),
    Skipped(SkipReason),
}

/// The rendered frame could not be shown.
#[derive(Debug, Error)]
#[error("failed to update ring display: {0}")]
pub struct CycleError<E: std::fmt::Debug + std::fmt::Display>(pub E);

/// Forecast ring driver: owns the configuration and the renderer built from it.
#[derive(Debug, Clone)]
pub struct ForecastRing {
    config: RingConfig,
    renderer: RingRenderer,
}

impl ForecastRing {
    pub fn new(config: RingConfig) -> Result<Self, ConfigError> {
        let renderer = RingRenderer::new(&config)?;
        Ok(Self { config, renderer })
    }

    #[inline]
    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    #[inline]
    pub fn renderer(&self) -> &RingRenderer {
        &self.renderer
    }

    /// Ingest `records` and keep the samples inside the horizon from `now`.
    ///
    /// Also returns how many records were rejected during ingestion.
    pub fn build_window(
        &self,
        records: &[ForecastRecord],
        now: DateTime<Utc>,
    ) -> (TimeSeriesWindow, usize) {
        let ingested = ingest(records, self.config.bad_timestamps);
        let window = TimeSeriesWindow::build(now, self.config.horizon(), ingested.samples);
        debug!(
            "window holds {} of {} records ({} rejected)",
            window.len(),
            records.len(),
            ingested.rejected.len()
        );
        (window, ingested.rejected.len())
    }

    /// Turn decoded records into a frame for `now`.
    pub fn render_records(
        &self,
        records: &[ForecastRecord],
        now: DateTime<Utc>,
    ) -> Result<RingFrame, NoData> {
        let (window, _) = self.build_window(records, now);
        self.renderer.render_window(&window, now)
    }

    /// Run one cycle end to end.
    ///
    /// Clock, fetch and data problems skip the cycle; only a failure to
    /// show the rendered frame is an error.
    pub fn refresh<S, C, D>(
        &self,
        source: &mut S,
        clock: &mut C,
        display: &mut D,
    ) -> Result<CycleOutcome, CycleError<D::Error>>
    where
        S: ForecastSource,
        C: WallClock,
        D: RingDisplay,
    {
        let Some(now) = clock.now() else {
            warn!("failed to obtain time, skipping refresh");
            return Ok(CycleOutcome::Skipped(SkipReason::NoTime));
        };

        let records = match source.fetch(now) {
            Ok(records) => records,
            Err(e) => {
                warn!("forecast fetch failed, keeping previous frame: {e}");
                return Ok(CycleOutcome::Skipped(SkipReason::Fetch(e.to_string())));
            }
        };

        let (window, rejected) = self.build_window(&records, now);
        let frame = match self.renderer.render_window(&window, now) {
            Ok(frame) => frame,
            Err(NoData) => {
                warn!("no forecast data within the horizon ({rejected} records rejected)");
                return Ok(CycleOutcome::Skipped(SkipReason::NoData { rejected }));
            }
        };

        display.show(&frame).map_err(CycleError)?;
        info!(
            "rendered {} records at {}, now at LED {}",
            records.len(),
            now.format("%Y-%m-%dT%H:%MZ"),
            frame.now_index()
        );
        Ok(CycleOutcome::Rendered(frame))
    }
}
