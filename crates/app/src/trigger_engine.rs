//! Trigger engine: evaluates every zone once per wall-clock minute and
//! hands matches to the zone's sink.

use std::collections::BTreeMap;

use zonealarm_domain::firing::Firing;
use zonealarm_domain::id::ZoneId;
use zonealarm_domain::registry::AlarmRegistry;
use zonealarm_domain::time::WallClock;
use zonealarm_domain::zone_data::ZoneDataStore;

use crate::ports::AlarmSink;

/// What a tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Every firing delivered, by zone then firing order.
    pub fired: Vec<Firing>,
    /// A one-time alarm was consumed, so the snapshot is stale.
    pub state_changed: bool,
}

/// Holds one sink per zone and drives [`Zone::evaluate`](zonealarm_domain::zone::Zone::evaluate).
pub struct TriggerEngine<S> {
    sinks: BTreeMap<ZoneId, S>,
}

impl<S> Default for TriggerEngine<S> {
    fn default() -> Self {
        Self {
            sinks: BTreeMap::new(),
        }
    }
}

impl<S: AlarmSink> TriggerEngine<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `sink` to `zone`, replacing any previous one.
    pub fn register_sink(&mut self, zone: ZoneId, sink: S) {
        self.sinks.insert(zone, sink);
    }

    /// Evaluate every zone that has a sink against `now`.
    ///
    /// Zones without a sink are left untouched, watermark included. Payloads
    /// of consumed one-time alarms are dropped after their firing went out.
    /// A failing sink is logged and does not stop other firings.
    pub async fn tick(
        &self,
        registry: &mut AlarmRegistry,
        zone_data: &mut ZoneDataStore,
        now: WallClock,
    ) -> TickReport {
        let mut report = TickReport::default();

        for zone in registry.zones_mut() {
            let zone_id = zone.id();
            let Some(sink) = self.sinks.get(&zone_id) else {
                tracing::trace!(zone = %zone_id, "no sink registered, skipping zone");
                continue;
            };
            let Some(evaluation) = zone.evaluate(&now) else {
                continue;
            };

            for alarm in &evaluation.fired {
                let firing = Firing {
                    zone: zone_id,
                    slot: alarm.slot,
                    action: alarm.action,
                    payload: zone_data.get_or_empty(zone_id, alarm.slot),
                    at: now,
                };
                tracing::info!(
                    zone = %zone_id,
                    slot = %alarm.slot,
                    action = %alarm.action,
                    at = %firing.at_display(),
                    "zone triggered"
                );
                if let Err(err) = sink.invoke(&firing).await {
                    tracing::warn!(zone = %zone_id, error = %err, "sink failed");
                }
                report.fired.push(firing);
            }

            for slot in &evaluation.consumed {
                zone_data.remove(zone_id, *slot);
            }
            report.state_changed |= evaluation.state_changed();
        }

        report
    }
}
