//! Sink port: where a zone's firings go.

use std::future::Future;

use zonealarm_domain::error::ZoneAlarmError;
use zonealarm_domain::firing::Firing;

/// Receives every firing of the zone it is registered for.
pub trait AlarmSink {
    fn invoke(&self, firing: &Firing) -> impl Future<Output = Result<(), ZoneAlarmError>> + Send;
}

impl<T: AlarmSink + Send + Sync> AlarmSink for std::sync::Arc<T> {
    fn invoke(&self, firing: &Firing) -> impl Future<Output = Result<(), ZoneAlarmError>> + Send {
        (**self).invoke(firing)
    }
}
