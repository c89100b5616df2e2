//! Wall-clock values: time of day, calendar dates and full readings.
//!
//! The scheduler works in local wall-clock time without a timezone, so
//! readings are [`NaiveDateTime`]s. Protocol strings are parsed leniently
//! on digit width (`8:5` is `08:05`) but strictly on structure and range.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use crate::error::ValidationError;

/// A wall-clock reading as delivered by the clock source.
pub type WallClock = NaiveDateTime;

/// Years accepted for calendar alarms, `set` requests and clock readings.
pub const VALID_YEARS: RangeInclusive<i32> = 2000..=2099;

/// Hour and minute at which an alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build from numeric parts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTime`] when `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime);
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Whether `at` falls within this hour and minute.
    #[must_use]
    pub fn matches(self, at: &WallClock) -> bool {
        at.hour() == u32::from(self.hour) && at.minute() == u32::from(self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s.trim().split_once(':').ok_or(ValidationError::InvalidTime)?;
        let hour = parse_digits(hour, 2).ok_or(ValidationError::InvalidTime)?;
        let minute = parse_digits(minute, 2).ok_or(ValidationError::InvalidTime)?;
        let hour = u8::try_from(hour).map_err(|_| ValidationError::InvalidTime)?;
        let minute = u8::try_from(minute).map_err(|_| ValidationError::InvalidTime)?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A Gregorian calendar date restricted to [`VALID_YEARS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build from numeric parts, applying the Gregorian leap-year rule.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDate`] when the year is outside
    /// [`VALID_YEARS`] or the day does not exist in that month.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        if !VALID_YEARS.contains(&year) {
            return Err(ValidationError::InvalidDate);
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(ValidationError::InvalidDate)
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }
}

impl FromStr for CalendarDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ValidationError::InvalidDate);
        };
        let year = parse_digits(year, 4).ok_or(ValidationError::InvalidDate)?;
        let month = parse_digits(month, 2).ok_or(ValidationError::InvalidDate)?;
        let day = parse_digits(day, 2).ok_or(ValidationError::InvalidDate)?;
        let year = i32::try_from(year).map_err(|_| ValidationError::InvalidDate)?;
        Self::new(year, month, day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Parse a `set` request: `YYYY-MM-DD HH:MM[:SS]`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDateTime`] for any structural or range
/// problem, including years outside [`VALID_YEARS`].
pub fn parse_wall_clock(input: &str) -> Result<WallClock, ValidationError> {
    let (date, time) = input
        .trim()
        .split_once(' ')
        .ok_or(ValidationError::InvalidDateTime)?;
    let date: CalendarDate = date.parse().map_err(|_| ValidationError::InvalidDateTime)?;

    let mut parts = time.trim().split(':');
    let (Some(hour), Some(minute)) = (parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidDateTime);
    };
    let second = parts.next().unwrap_or("0");
    if parts.next().is_some() {
        return Err(ValidationError::InvalidDateTime);
    }

    let hour = parse_digits(hour, 2).ok_or(ValidationError::InvalidDateTime)?;
    let minute = parse_digits(minute, 2).ok_or(ValidationError::InvalidDateTime)?;
    let second = parse_digits(second, 2).ok_or(ValidationError::InvalidDateTime)?;
    let time =
        NaiveTime::from_hms_opt(hour, minute, second).ok_or(ValidationError::InvalidDateTime)?;

    Ok(date.0.and_time(time))
}

/// Render a reading the way the `time` command reports it.
#[must_use]
pub fn format_wall_clock(at: &WallClock) -> String {
    at.format("%Y/%m/%d %H:%M:%S").to_string()
}

/// Minutes since the Unix epoch, used as the trigger debounce key.
#[must_use]
pub fn minute_number(at: &WallClock) -> i64 {
    at.and_utc().timestamp().div_euclid(60)
}

/// Parse `1..=max_len` ASCII digits.
fn parse_digits(input: &str, max_len: usize) -> Option<u32> {
    if input.is_empty() || input.len() > max_len || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}
