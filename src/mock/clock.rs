use chrono::{DateTime, Duration, Utc};

use crate::WallClock;

/// Host system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&mut self) -> Option<DateTime<Utc>> {
        Some(Utc::now())
    }
}

/// Manually driven clock for tests and replays.
///
/// `None` simulates a clock that has not been synchronised yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedClock(Option<DateTime<Utc>>);

impl FixedClock {
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self(Some(now))
    }

    pub const fn unsynchronised() -> Self {
        Self(None)
    }

    /// Move the clock forward; an unsynchronised clock stays unsynchronised.
    pub fn advance(&mut self, by: Duration) {
        self.0 = self.0.and_then(|now| now.checked_add_signed(by));
    }
}

impl WallClock for FixedClock {
    fn now(&mut self) -> Option<DateTime<Utc>> {
        self.0
    }
}
