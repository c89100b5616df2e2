//! A single sink invocation.

use serde::{Deserialize, Serialize};

use crate::alarm::Action;
use crate::id::{SlotId, ZoneId};
use crate::time::{WallClock, format_wall_clock};
use crate::zone_data::ZoneDataPayload;

/// Delivered to a zone's sink when one of its alarms matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firing {
    pub zone: ZoneId,
    pub slot: SlotId,
    pub action: Action,
    pub payload: ZoneDataPayload,
    pub at: WallClock,
}

impl Firing {
    /// Reading formatted as `YYYY/MM/DD HH:MM:SS`.
    #[must_use]
    pub fn at_display(&self) -> String {
        format_wall_clock(&self.at)
    }
}
