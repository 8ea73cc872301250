use chrono::{DateTime, Utc};
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use esp_idf_svc::sys::EspError;

use crate::WallClock;

/// Wall clock kept in sync over SNTP (pool.ntp.org by default).
pub struct SntpClock {
    sntp: EspSntp<'static>,
}

impl SntpClock {
    /// Start the SNTP client. Time is unavailable until the first sync.
    pub fn start() -> Result<Self, EspError> {
        Ok(Self {
            sntp: EspSntp::new_default()?,
        })
    }
}

impl WallClock for SntpClock {
    fn now(&mut self) -> Option<DateTime<Utc>> {
        (self.sntp.get_sync_status() == SyncStatus::Completed).then(Utc::now)
    }
}
