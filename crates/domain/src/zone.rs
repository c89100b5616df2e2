//! Zone: a fixed arena of alarm slots plus the per-minute debounce watermark.

use crate::alarm::{Alarm, AlarmSpec};
use crate::error::CapacityError;
use crate::id::{SlotId, ZoneId};
use crate::time::{WallClock, minute_number};

/// Number of zones, ids `1..=ZONE_COUNT`.
pub const ZONE_COUNT: u8 = 4;

/// Maximum number of active alarms per zone.
pub const ZONE_CAPACITY: usize = 10;

/// Outcome of a successful [`Zone::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub slot: SlotId,
    /// Slots deactivated because they held the same time of day.
    pub evicted: Vec<SlotId>,
}

/// Outcome of a [`Zone::evaluate`] pass that was not debounced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Alarms that matched, in firing order.
    pub fired: Vec<Alarm>,
    /// One-time alarms deactivated by this pass.
    pub consumed: Vec<SlotId>,
}

impl Evaluation {
    #[must_use]
    pub fn state_changed(&self) -> bool {
        !self.consumed.is_empty()
    }
}

/// Up to [`ZONE_CAPACITY`] alarms sharing one sink.
#[derive(Debug, Clone)]
pub struct Zone {
    id: ZoneId,
    slots: [Option<Alarm>; ZONE_CAPACITY],
    last_trigger_minute: Option<i64>,
}

impl Zone {
    #[must_use]
    pub fn new(id: ZoneId) -> Self {
        Self {
            id,
            slots: [const { None }; ZONE_CAPACITY],
            last_trigger_minute: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Number of active alarms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= ZONE_CAPACITY
    }

    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&Alarm> {
        self.slots[usize::from(slot.get())].as_ref()
    }

    /// Active alarms in ascending slot order.
    pub fn alarms(&self) -> impl Iterator<Item = &Alarm> {
        self.slots.iter().flatten()
    }

    #[must_use]
    pub fn last_trigger_minute(&self) -> Option<i64> {
        self.last_trigger_minute
    }

    /// Place `spec` in a free slot and evict every other alarm with the same
    /// time of day.
    ///
    /// `preferred` is used when it is free; otherwise the lowest free slot is
    /// taken.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] when every slot is active. Nothing changes.
    pub fn insert(
        &mut self,
        spec: AlarmSpec,
        preferred: Option<SlotId>,
    ) -> Result<Insertion, CapacityError> {
        let slot = preferred
            .filter(|slot| self.get(*slot).is_none())
            .or_else(|| SlotId::all().find(|slot| self.get(*slot).is_none()))
            .ok_or(CapacityError { zone: self.id })?;

        let evicted: Vec<SlotId> = self
            .alarms()
            .filter(|alarm| alarm.time == spec.time)
            .map(|alarm| alarm.slot)
            .collect();
        for other in &evicted {
            self.slots[usize::from(other.get())] = None;
        }

        self.slots[usize::from(slot.get())] = Some(spec.into_alarm(slot));
        Ok(Insertion { slot, evicted })
    }

    /// Deactivate `slot`, returning the alarm that was there.
    pub fn remove(&mut self, slot: SlotId) -> Option<Alarm> {
        self.slots[usize::from(slot.get())].take()
    }

    /// Deactivate every slot. The watermark is kept.
    pub fn clear(&mut self) {
        self.slots = [const { None }; ZONE_CAPACITY];
    }

    /// Evaluate the alarms against `now`.
    ///
    /// Returns `None` when this minute was already evaluated. Calendar alarms
    /// are checked first and one-time ones are deactivated as they fire;
    /// weekly alarms are only checked when no calendar alarm fired. The
    /// watermark moves to the current minute whether or not anything fired.
    pub fn evaluate(&mut self, now: &WallClock) -> Option<Evaluation> {
        let current_minute = minute_number(now);
        if self.last_trigger_minute == Some(current_minute) {
            return None;
        }

        let mut evaluation = Evaluation::default();
        for entry in &mut self.slots {
            let Some(alarm) = entry else { continue };
            if !alarm.schedule.is_calendar() || !alarm.matches(now) {
                continue;
            }
            evaluation.fired.push(alarm.clone());
            if alarm.is_one_time() {
                evaluation.consumed.push(alarm.slot);
                *entry = None;
            }
        }

        if evaluation.fired.is_empty() {
            evaluation.fired = self
                .alarms()
                .filter(|alarm| !alarm.schedule.is_calendar() && alarm.matches(now))
                .cloned()
                .collect();
        }

        self.last_trigger_minute = Some(current_minute);
        Some(evaluation)
    }
}
