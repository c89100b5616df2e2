//! Time sync port: external acquisition of the current time.

use std::future::Future;

use zonealarm_domain::error::ZoneAlarmError;
use zonealarm_domain::time::WallClock;

/// Fetches the current local wall-clock time from an outside authority.
///
/// Implementations own their timeout; a call either completes or fails.
pub trait TimeSync {
    fn sync(&self) -> impl Future<Output = Result<WallClock, ZoneAlarmError>> + Send;
}
