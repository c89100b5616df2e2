use std::ops::RangeInclusive;

use chrono::{DateTime, FixedOffset, Utc};

use zonealarm_app::ports::TimeSync;
use zonealarm_domain::error::{ClockError, ZoneAlarmError};
use zonealarm_domain::time::WallClock;

/// Epoch seconds accepted from the host: 2025-01-01 to 2100-01-01 UTC.
pub const PLAUSIBLE_EPOCHS: RangeInclusive<i64> = 1_735_689_600..=4_102_444_800;

/// Time sync that trusts the host's UTC clock, within [`PLAUSIBLE_EPOCHS`].
pub struct HostTimeSync {
    utc_offset: FixedOffset,
    epoch: fn() -> i64,
}

impl HostTimeSync {
    #[must_use]
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self::with_epoch_source(utc_offset, || Utc::now().timestamp())
    }

    /// Use `epoch` instead of the host clock.
    #[must_use]
    pub fn with_epoch_source(utc_offset: FixedOffset, epoch: fn() -> i64) -> Self {
        Self { utc_offset, epoch }
    }

    fn read(&self) -> Result<WallClock, ClockError> {
        let epoch = (self.epoch)();
        if !PLAUSIBLE_EPOCHS.contains(&epoch) {
            return Err(ClockError::ImplausibleHostTime(epoch));
        }
        DateTime::from_timestamp(epoch, 0)
            .map(|utc| utc.with_timezone(&self.utc_offset).naive_local())
            .ok_or(ClockError::ImplausibleHostTime(epoch))
    }
}

impl TimeSync for HostTimeSync {
    async fn sync(&self) -> Result<WallClock, ZoneAlarmError> {
        let at = self.read()?;
        tracing::info!(at = %at, "host time acquired");
        Ok(at)
    }
}
