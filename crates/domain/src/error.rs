//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ZoneAlarmError`] via `#[from]`. The `Display` output of every leaf
//! error is the human-readable message sent back to protocol clients.

use crate::id::{SlotId, ZoneId};

/// Top-level error for every zonealarm operation.
#[derive(Debug, thiserror::Error)]
pub enum ZoneAlarmError {
    /// Input rejected before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The target zone already holds its maximum number of alarms.
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityError),

    /// The requested alarm does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The wall clock cannot be trusted.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// The byte store failed to read or write.
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons an alarm definition, zone data payload or request field is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid type")]
    InvalidKind,

    #[error("oneTime required for date-based")]
    MissingOneTime,

    #[error("oneTime only for date-based")]
    OneTimeNotAllowed,

    #[error("Invalid time format")]
    InvalidTime,

    #[error("Invalid action")]
    InvalidAction,

    #[error("Days required")]
    MissingDays,

    #[error("Invalid day: {0}")]
    InvalidDay(String),

    #[error("Invalid date format")]
    InvalidDate,

    #[error("Invalid callback ID. Use 1–4")]
    InvalidZone(i64),

    #[error("Invalid slot: {0}")]
    InvalidSlot(i64),

    #[error("zone_data must be a JSON object")]
    PayloadNotObject,

    #[error("zone_data too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid time format. Use YYYY-MM-DD HH:MM[:SS]")]
    InvalidDateTime,
}

/// A zone has no free slot left.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Callback full")]
pub struct CapacityError {
    pub zone: ZoneId,
}

/// No active alarm lives at the requested position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid ID")]
pub struct NotFoundError {
    pub zone: ZoneId,
    pub slot: i64,
}

impl NotFoundError {
    /// Build a not-found error for a slot that is in range but inactive.
    #[must_use]
    pub fn inactive(zone: ZoneId, slot: SlotId) -> Self {
        Self {
            zone,
            slot: i64::from(slot.get()),
        }
    }
}

/// Why a wall-clock reading or clock update was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("clock not set")]
    Unset,

    #[error("Invalid clock year: {0}")]
    ImplausibleYear(i32),

    #[error("implausible host time: {0}")]
    ImplausibleHostTime(i64),
}
