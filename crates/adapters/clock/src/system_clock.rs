use std::sync::{Mutex, PoisonError};

use chrono::{Datelike, FixedOffset, TimeDelta, Utc};

use zonealarm_app::ports::ClockSource;
use zonealarm_domain::error::ClockError;
use zonealarm_domain::time::{VALID_YEARS, WallClock};

/// Local wall clock derived from the host clock.
pub struct SystemClock {
    utc_offset: FixedOffset,
    /// Offset from host local time; `None` while the clock is unset.
    correction: Mutex<Option<TimeDelta>>,
}

impl SystemClock {
    /// Create a clock for `utc_offset`.
    ///
    /// With `trust_host_time` the host time is used as-is from the start;
    /// otherwise the clock stays unset until [`ClockSource::set`] is called.
    #[must_use]
    pub fn new(utc_offset: FixedOffset, trust_host_time: bool) -> Self {
        Self {
            utc_offset,
            correction: Mutex::new(trust_host_time.then(TimeDelta::zero)),
        }
    }

    /// Like [`SystemClock::new`] with the offset in seconds east of UTC.
    /// Returns `None` when the offset is not within ±24h.
    #[must_use]
    pub fn with_offset_secs(secs: i32, trust_host_time: bool) -> Option<Self> {
        FixedOffset::east_opt(secs).map(|offset| Self::new(offset, trust_host_time))
    }

    fn host_local(&self) -> WallClock {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }

    fn correction(&self) -> std::sync::MutexGuard<'_, Option<TimeDelta>> {
        self.correction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_year(at: WallClock) -> Result<WallClock, ClockError> {
    if VALID_YEARS.contains(&at.year()) {
        Ok(at)
    } else {
        Err(ClockError::ImplausibleYear(at.year()))
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> Result<WallClock, ClockError> {
        let correction = (*self.correction()).ok_or(ClockError::Unset)?;
        let reading = self
            .host_local()
            .checked_add_signed(correction)
            .ok_or(ClockError::Unset)?;
        check_year(reading)
    }

    fn set(&self, at: WallClock) -> Result<(), ClockError> {
        let at = check_year(at)?;
        let correction = at.signed_duration_since(self.host_local());
        *self.correction() = Some(correction);
        tracing::debug!(correction_secs = correction.num_seconds(), "clock corrected");
        Ok(())
    }
}
