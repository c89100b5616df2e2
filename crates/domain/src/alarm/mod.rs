//! Alarms: one scheduled trigger inside a zone.
//!
//! Requests arrive as loosely typed [`AlarmDraft`]s (the wire shape used by
//! the command protocol and the persisted snapshot). [`AlarmDraft::validate`]
//! turns a draft into an [`AlarmSpec`], which a zone places into a slot to
//! become an [`Alarm`].

mod action;
mod schedule;
mod weekday;

pub use action::Action;
pub use schedule::Schedule;
pub use weekday::WeekdaySet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{SlotId, ZoneId};
use crate::time::{CalendarDate, TimeOfDay, WallClock};

/// An active alarm occupying a slot of its zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub slot: SlotId,
    pub schedule: Schedule,
    pub time: TimeOfDay,
    pub action: Action,
}

impl Alarm {
    /// Whether the alarm fires at `at`.
    #[must_use]
    pub fn matches(&self, at: &WallClock) -> bool {
        self.time.matches(at) && self.schedule.matches_day(at)
    }

    #[must_use]
    pub fn is_one_time(&self) -> bool {
        self.schedule.is_one_time()
    }
}

/// A validated alarm definition that has not been given a slot yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmSpec {
    pub schedule: Schedule,
    pub time: TimeOfDay,
    pub action: Action,
}

impl AlarmSpec {
    /// Place the definition at `slot`.
    #[must_use]
    pub fn into_alarm(self, slot: SlotId) -> Alarm {
        Alarm {
            slot,
            schedule: self.schedule,
            time: self.time,
            action: self.action,
        }
    }
}

/// Unvalidated alarm fields as they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmDraft {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "oneTime", default, skip_serializing_if = "Option::is_none")]
    pub one_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
}

impl AlarmDraft {
    /// Draft of a weekly alarm.
    #[must_use]
    pub fn weekly<I, S>(days: I, time: &str, action: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: Some("day".to_string()),
            time: Some(time.to_string()),
            action: Some(action.to_string()),
            days: Some(days.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Draft of a calendar alarm.
    #[must_use]
    pub fn calendar(date: &str, one_time: bool, time: &str, action: &str) -> Self {
        Self {
            kind: Some("date".to_string()),
            time: Some(time.to_string()),
            action: Some(action.to_string()),
            date: Some(date.to_string()),
            one_time: Some(one_time),
            ..Self::default()
        }
    }

    /// Check every field and build an [`AlarmSpec`].
    ///
    /// Fields are checked in protocol order so the first problem reported is
    /// stable: type, `oneTime`, time, action, then days or date.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first invalid field.
    pub fn validate(&self) -> Result<AlarmSpec, ValidationError> {
        let calendar = match self.kind.as_deref() {
            Some("day") => false,
            Some("date") => true,
            _ => return Err(ValidationError::InvalidKind),
        };

        let repeats = if calendar {
            !self.one_time.ok_or(ValidationError::MissingOneTime)?
        } else if self.one_time == Some(true) {
            return Err(ValidationError::OneTimeNotAllowed);
        } else {
            true
        };

        let time: TimeOfDay = self
            .time
            .as_deref()
            .ok_or(ValidationError::InvalidTime)?
            .parse()?;
        let action: Action = self
            .action
            .as_deref()
            .ok_or(ValidationError::InvalidAction)?
            .parse()?;

        let schedule = if calendar {
            let date: CalendarDate = self
                .date
                .as_deref()
                .ok_or(ValidationError::InvalidDate)?
                .parse()?;
            Schedule::Calendar { date, repeats }
        } else {
            let days = self.days.as_deref().ok_or(ValidationError::MissingDays)?;
            Schedule::Weekly {
                days: WeekdaySet::from_tokens(days)?,
            }
        };

        Ok(AlarmSpec {
            schedule,
            time,
            action,
        })
    }
}

impl From<&Alarm> for AlarmDraft {
    fn from(alarm: &Alarm) -> Self {
        let mut draft = Self {
            kind: Some(alarm.schedule.kind().to_string()),
            time: Some(alarm.time.to_string()),
            action: Some(alarm.action.to_string()),
            ..Self::default()
        };
        match alarm.schedule {
            Schedule::Weekly { days } => {
                draft.days = Some(days.into());
            }
            Schedule::Calendar { date, repeats } => {
                draft.date = Some(date.to_string());
                draft.one_time = Some(!repeats);
            }
        }
        draft
    }
}

/// An alarm tagged with its owning zone, as listed and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    #[serde(alias = "callback")]
    pub zone: ZoneId,
    pub id: SlotId,
    #[serde(flatten)]
    pub draft: AlarmDraft,
}

impl AlarmRecord {
    #[must_use]
    pub fn new(zone: ZoneId, alarm: &Alarm) -> Self {
        Self {
            zone,
            id: alarm.slot,
            draft: AlarmDraft::from(alarm),
        }
    }
}
