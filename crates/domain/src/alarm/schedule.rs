//! When an alarm recurs.

use chrono::Datelike;

use super::weekday::WeekdaySet;
use crate::time::{CalendarDate, WallClock};

/// Recurrence rule of an [`Alarm`](super::Alarm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Fires every week on the listed days.
    Weekly { days: WeekdaySet },
    /// Fires on a month/day, every year when `repeats`, otherwise once on
    /// the exact date.
    Calendar { date: CalendarDate, repeats: bool },
}

impl Schedule {
    /// Protocol token for the `type` field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Weekly { .. } => "day",
            Self::Calendar { .. } => "date",
        }
    }

    #[must_use]
    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::Calendar { .. })
    }

    /// A calendar alarm that does not repeat.
    #[must_use]
    pub fn is_one_time(&self) -> bool {
        matches!(self, Self::Calendar { repeats: false, .. })
    }

    /// Whether the day part of `at` satisfies this rule. Time of day is
    /// checked by the alarm.
    #[must_use]
    pub fn matches_day(&self, at: &WallClock) -> bool {
        match self {
            Self::Weekly { days } => days.contains(at.weekday()),
            Self::Calendar { date, repeats } => {
                date.month() == at.month()
                    && date.day() == at.day()
                    && (*repeats || date.year() == at.year())
            }
        }
    }
}
