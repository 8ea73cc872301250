use std::time::{Duration, Instant};

/// Fixed-period refresh timer on a monotonic clock.
///
/// Fires on the first poll, then once per elapsed period. Missed periods
/// are collapsed into a single firing and the next deadline stays aligned
/// to the original period boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    period: Duration,
    last: Option<Instant>,
}

impl RefreshSchedule {
    pub const fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns `true` when a refresh is due at `now`, and arms the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            return true;
        };

        // saturating: a `now` earlier than `last` counts as no time passed
        let elapsed = now.saturating_duration_since(last);
        if self.period.is_zero() || elapsed < self.period {
            return false;
        }

        let periods = elapsed.as_nanos() / self.period.as_nanos();
        let advance = u32::try_from(periods)
            .ok()
            .and_then(|n| self.period.checked_mul(n))
            .unwrap_or(elapsed);
        self.last = Some(last.checked_add(advance).unwrap_or(now));
        true
    }

    /// Time left until the next refresh is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => self
                .period
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }
}
