//! Scheduler: the single owner of the registry, zone data, trigger engine
//! and persistence. Every mutation goes through here and ends with a save.

use serde_json::Value;

use zonealarm_domain::alarm::{AlarmDraft, AlarmRecord};
use zonealarm_domain::error::{ClockError, ZoneAlarmError};
use zonealarm_domain::id::{SlotId, ZoneId};
use zonealarm_domain::registry::AlarmRegistry;
use zonealarm_domain::time::WallClock;
use zonealarm_domain::zone_data::{ZoneDataPayload, ZoneDataStore};

use crate::persistence::{LoadReport, PersistenceManager};
use crate::ports::{AlarmSink, ByteStore, ClockSource};
use crate::trigger_engine::{TickReport, TriggerEngine};

/// A mutation that was applied in memory, with the outcome of the save that
/// followed it.
///
/// In-memory state stays authoritative when `persisted` is an error; the next
/// tick retries the save.
#[derive(Debug)]
pub struct Committed<T> {
    pub value: T,
    pub persisted: Result<(), ZoneAlarmError>,
}

/// Explicitly constructed scheduler state.
pub struct Scheduler<B, S, C> {
    registry: AlarmRegistry,
    zone_data: ZoneDataStore,
    engine: TriggerEngine<S>,
    persistence: PersistenceManager<B>,
    clock: C,
    dirty: bool,
}

impl<B, S, C> Scheduler<B, S, C>
where
    B: ByteStore,
    S: AlarmSink,
    C: ClockSource,
{
    /// Create an empty scheduler. Call [`Scheduler::boot`] to load the snapshot.
    pub fn new(store: B, clock: C) -> Self {
        Self {
            registry: AlarmRegistry::new(),
            zone_data: ZoneDataStore::new(),
            engine: TriggerEngine::new(),
            persistence: PersistenceManager::new(store),
            clock,
            dirty: false,
        }
    }

    /// Attach the sink that receives `zone`'s firings.
    pub fn register_sink(&mut self, zone: ZoneId, sink: S) {
        self.engine.register_sink(zone, sink);
    }

    #[must_use]
    pub fn registry(&self) -> &AlarmRegistry {
        &self.registry
    }

    #[must_use]
    pub fn zone_data(&self) -> &ZoneDataStore {
        &self.zone_data
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn store(&self) -> &B {
        self.persistence.store()
    }

    /// Whether the last save failed and has not been retried successfully.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the in-memory state from the byte store.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::Storage`] when the alarm collection cannot be read.
    pub async fn load_snapshot(&mut self) -> Result<LoadReport, ZoneAlarmError> {
        self.persistence
            .load(&mut self.registry, &mut self.zone_data)
            .await
    }

    /// Load the snapshot at start-up. A failed load leaves an empty registry.
    #[tracing::instrument(skip(self))]
    pub async fn boot(&mut self) -> LoadReport {
        match self.load_snapshot().await {
            Ok(report) => {
                tracing::info!(
                    restored = report.restored,
                    zone_data = report.zone_data_restored,
                    rejected = report.rejected.len(),
                    orphaned = report.orphaned,
                    "snapshot loaded"
                );
                report
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot unreadable, starting empty");
                self.clear();
                LoadReport::default()
            }
        }
    }

    /// Write the full snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::Storage`] when the write fails; the scheduler
    /// is then marked dirty.
    pub async fn save_snapshot(&mut self) -> Result<(), ZoneAlarmError> {
        match self.persistence.save(&self.registry, &self.zone_data).await {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot save failed");
                self.dirty = true;
                Err(err)
            }
        }
    }

    /// Drop every alarm and payload from memory. The store is not touched.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.zone_data.clear();
    }

    /// Add an alarm to `zone` and attach `zone_data` to its slot.
    ///
    /// Alarms evicted by a same-time conflict lose their payload. Without
    /// `zone_data` any stale payload at the new slot is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::Validation`] for an invalid payload, then
    /// whatever [`AlarmRegistry::add`] reports. Nothing changes on error.
    #[tracing::instrument(skip(self, draft, zone_data), fields(zone = %zone))]
    pub async fn add_alarm(
        &mut self,
        zone: ZoneId,
        draft: &AlarmDraft,
        zone_data: Option<Value>,
    ) -> Result<Committed<SlotId>, ZoneAlarmError> {
        let payload = zone_data.map(ZoneDataPayload::new).transpose()?;
        let insertion = self.registry.add(zone, draft)?;
        for evicted in &insertion.evicted {
            tracing::info!(slot = %evicted, "evicted alarm with the same time");
            self.zone_data.remove(zone, *evicted);
        }
        match payload {
            Some(payload) => self.zone_data.put(zone, insertion.slot, payload),
            None => {
                self.zone_data.remove(zone, insertion.slot);
            }
        }
        tracing::info!(slot = %insertion.slot, "alarm added");

        let persisted = self.save_snapshot().await;
        Ok(Committed {
            value: insertion.slot,
            persisted,
        })
    }

    /// Delete the alarm at `(zone, slot)` together with its payload.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::NotFound`] when the slot is not active.
    #[tracing::instrument(skip(self), fields(zone = %zone, slot = %slot))]
    pub async fn delete_alarm(
        &mut self,
        zone: ZoneId,
        slot: SlotId,
    ) -> Result<Committed<()>, ZoneAlarmError> {
        self.registry.remove(zone, slot)?;
        self.zone_data.remove(zone, slot);
        tracing::info!("alarm deleted");

        let persisted = self.save_snapshot().await;
        Ok(Committed {
            value: (),
            persisted,
        })
    }

    /// Every active alarm, by zone then slot.
    #[must_use]
    pub fn list(&self) -> Vec<AlarmRecord> {
        self.registry.list()
    }

    /// Current clock reading.
    ///
    /// # Errors
    ///
    /// Forwards the clock's [`ClockError`].
    pub fn now(&self) -> Result<WallClock, ClockError> {
        self.clock.now()
    }

    /// Set the clock.
    ///
    /// # Errors
    ///
    /// Forwards the clock's [`ClockError`].
    pub fn set_clock(&self, at: WallClock) -> Result<(), ClockError> {
        self.clock.set(at)?;
        tracing::info!(at = %at, "clock set");
        Ok(())
    }

    /// Run one trigger evaluation against the clock.
    ///
    /// Skipped entirely when the clock cannot be read. Saves when a one-time
    /// alarm was consumed or an earlier save failed.
    pub async fn tick(&mut self) -> TickReport {
        let now = match self.clock.now() {
            Ok(now) => now,
            Err(err) => {
                tracing::debug!(error = %err, "tick skipped");
                return TickReport::default();
            }
        };

        let report = self
            .engine
            .tick(&mut self.registry, &mut self.zone_data, now)
            .await;
        if report.state_changed || self.dirty {
            // failures are logged and keep the scheduler dirty
            let _ = self.save_snapshot().await;
        }
        report
    }
}
