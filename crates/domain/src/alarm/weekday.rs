//! Weekday sets for weekly alarms.

use std::fmt;

use chrono::Weekday;
use crate::error::ValidationError;

/// Protocol tokens in bit order (Sunday first).
const TOKENS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// A non-ordered set of weekdays stored as a 7-bit mask, Sunday = bit 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Parse a list of case-insensitive three-letter tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingDays`] for an empty list and
    /// [`ValidationError::InvalidDay`] for the first unrecognised token.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for token in tokens {
            let token = token.as_ref();
            let lowered = token.trim().to_ascii_lowercase();
            let index = TOKENS
                .iter()
                .position(|t| *t == lowered)
                .ok_or_else(|| ValidationError::InvalidDay(token.to_string()))?;
            set.0 |= 1 << index;
        }
        if set.is_empty() {
            return Err(ValidationError::MissingDays);
        }
        Ok(set)
    }

    /// Add a weekday.
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Tokens of the contained days, Sunday first.
    pub fn tokens(self) -> impl Iterator<Item = &'static str> {
        TOKENS
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.0 & (1 << index) != 0)
            .map(|(_, token)| *token)
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = Self::default();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<WeekdaySet> for Vec<String> {
    fn from(value: WeekdaySet) -> Self {
        value.tokens().map(str::to_string).collect()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.tokens().collect();
        f.write_str(&tokens.join(","))
    }
}
