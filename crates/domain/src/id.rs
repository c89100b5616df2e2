//! Typed identifier newtypes backed by small, range-checked integers.
//!
//! Zones and slots are fixed at compile time, so their identifiers are plain
//! bounded integers rather than generated ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::zone::{ZONE_CAPACITY, ZONE_COUNT};

#[allow(clippy::cast_possible_truncation)]
const LAST_SLOT: u8 = (ZONE_CAPACITY - 1) as u8;

macro_rules! define_index {
    ($(#[doc = $doc:expr])* $name:ident, $min:expr, $max:expr, $invalid:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "u8")]
        pub struct $name(u8);

        impl $name {
            /// Smallest valid value.
            pub const MIN: u8 = $min;
            /// Largest valid value.
            pub const MAX: u8 = $max;

            /// Validate and wrap a raw integer.
            ///
            /// # Errors
            ///
            #[doc = concat!("Returns [`ValidationError::", stringify!($invalid), "`] when `value` is out of range.")]
            pub fn new(value: i64) -> Result<Self, ValidationError> {
                match u8::try_from(value) {
                    Ok(raw) if (Self::MIN..=Self::MAX).contains(&raw) => Ok(Self(raw)),
                    _ => Err(ValidationError::$invalid(value)),
                }
            }

            /// Access the inner value.
            #[must_use]
            pub fn get(self) -> u8 {
                self.0
            }

            /// Every valid identifier in ascending order.
            pub fn all() -> impl Iterator<Item = Self> {
                (Self::MIN..=Self::MAX).map(Self)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u8 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| ValidationError::$invalid(-1))?;
                Self::new(value)
            }
        }
    };
}

define_index!(
    /// Identifier of a [`Zone`](crate::zone::Zone), `1..=ZONE_COUNT`.
    ZoneId,
    1,
    ZONE_COUNT,
    InvalidZone
);

define_index!(
    /// Index of an alarm slot inside its zone, `0..ZONE_CAPACITY`.
    SlotId,
    0,
    LAST_SLOT,
    InvalidSlot
);
