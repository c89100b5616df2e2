//! The alarm registry: every zone, addressed by [`ZoneId`].

use crate::alarm::{AlarmDraft, AlarmRecord};
use crate::error::{CapacityError, NotFoundError, ZoneAlarmError};
use crate::id::{SlotId, ZoneId};
use crate::zone::{Insertion, Zone};

/// Fixed set of [`Zone`]s, one per [`ZoneId`].
#[derive(Debug, Clone)]
pub struct AlarmRegistry {
    zones: Vec<Zone>,
}

impl Default for AlarmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            zones: ZoneId::all().map(Zone::new).collect(),
        }
    }

    fn index(zone: ZoneId) -> usize {
        usize::from(zone.get() - ZoneId::MIN)
    }

    #[must_use]
    pub fn zone(&self, zone: ZoneId) -> &Zone {
        &self.zones[Self::index(zone)]
    }

    pub fn zone_mut(&mut self, zone: ZoneId) -> &mut Zone {
        &mut self.zones[Self::index(zone)]
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn zones_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.iter_mut()
    }

    /// Validate `draft` and add it to `zone` in the lowest free slot.
    ///
    /// Capacity is checked before the draft, so a full zone reports
    /// "Callback full" even for an invalid draft.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::CapacityExceeded`] when the zone is full and
    /// [`ZoneAlarmError::Validation`] for an invalid draft. Nothing changes
    /// on error.
    pub fn add(&mut self, zone: ZoneId, draft: &AlarmDraft) -> Result<Insertion, ZoneAlarmError> {
        self.place(zone, draft, None)
    }

    /// Like [`AlarmRegistry::add`], but tries `slot` first. Used when
    /// replaying a snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`AlarmRegistry::add`].
    pub fn restore(
        &mut self,
        zone: ZoneId,
        slot: SlotId,
        draft: &AlarmDraft,
    ) -> Result<Insertion, ZoneAlarmError> {
        self.place(zone, draft, Some(slot))
    }

    fn place(
        &mut self,
        zone: ZoneId,
        draft: &AlarmDraft,
        preferred: Option<SlotId>,
    ) -> Result<Insertion, ZoneAlarmError> {
        let target = self.zone_mut(zone);
        if target.is_full() {
            return Err(CapacityError { zone }.into());
        }
        let spec = draft.validate()?;
        Ok(target.insert(spec, preferred)?)
    }

    /// Deactivate the alarm at `slot`. Returns `false` when the slot was
    /// already free.
    pub fn delete(&mut self, zone: ZoneId, slot: SlotId) -> bool {
        self.zone_mut(zone).remove(slot).is_some()
    }

    /// Like [`AlarmRegistry::delete`] but reports an inactive slot as an error.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no alarm is active at `slot`.
    pub fn remove(&mut self, zone: ZoneId, slot: SlotId) -> Result<(), NotFoundError> {
        if self.delete(zone, slot) {
            Ok(())
        } else {
            Err(NotFoundError::inactive(zone, slot))
        }
    }

    /// Every active alarm, by zone then slot.
    #[must_use]
    pub fn list(&self) -> Vec<AlarmRecord> {
        self.zones
            .iter()
            .flat_map(|zone| zone.alarms().map(|alarm| AlarmRecord::new(zone.id(), alarm)))
            .collect()
    }

    /// Number of active alarms across all zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.iter().map(Zone::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an alarm is active at `(zone, slot)`.
    #[must_use]
    pub fn contains(&self, zone: ZoneId, slot: SlotId) -> bool {
        self.zone(zone).get(slot).is_some()
    }

    /// Deactivate every alarm in every zone.
    pub fn clear(&mut self) {
        for zone in &mut self.zones {
            zone.clear();
        }
    }
}
