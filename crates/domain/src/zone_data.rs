//! Opaque payloads attached to alarms and handed to the sink on firing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::id::{SlotId, ZoneId};

/// Largest accepted payload, measured as compact serialized JSON.
pub const MAX_ZONE_DATA_BYTES: usize = 1000;

/// A JSON object of at most [`MAX_ZONE_DATA_BYTES`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ZoneDataPayload(Map<String, Value>);

impl ZoneDataPayload {
    /// Validate a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PayloadNotObject`] for anything but an
    /// object and [`ValidationError::PayloadTooLarge`] when it serializes to
    /// more than [`MAX_ZONE_DATA_BYTES`].
    pub fn new(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::PayloadNotObject);
        };
        let size = Value::Object(map.clone()).to_string().len();
        if size > MAX_ZONE_DATA_BYTES {
            return Err(ValidationError::PayloadTooLarge {
                size,
                max: MAX_ZONE_DATA_BYTES,
            });
        }
        Ok(Self(map))
    }

    /// The empty object sinks receive when an alarm has no payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl<'de> Deserialize<'de> for ZoneDataPayload {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// One persisted payload entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDataRecord {
    #[serde(alias = "callback")]
    pub zone: ZoneId,
    pub id: SlotId,
    pub zone_data: ZoneDataPayload,
}

/// Payloads keyed by `(zone, slot)`. Sole owner of every payload.
#[derive(Debug, Clone, Default)]
pub struct ZoneDataStore {
    entries: BTreeMap<(ZoneId, SlotId), ZoneDataPayload>,
}

impl ZoneDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the payload at `(zone, slot)`.
    pub fn put(&mut self, zone: ZoneId, slot: SlotId, payload: ZoneDataPayload) {
        self.entries.insert((zone, slot), payload);
    }

    #[must_use]
    pub fn get(&self, zone: ZoneId, slot: SlotId) -> Option<&ZoneDataPayload> {
        self.entries.get(&(zone, slot))
    }

    /// Payload at `(zone, slot)`, or the empty object.
    #[must_use]
    pub fn get_or_empty(&self, zone: ZoneId, slot: SlotId) -> ZoneDataPayload {
        self.get(zone, slot).cloned().unwrap_or_default()
    }

    pub fn remove(&mut self, zone: ZoneId, slot: SlotId) -> Option<ZoneDataPayload> {
        self.entries.remove(&(zone, slot))
    }

    /// Drop every entry for which `keep` is false, returning how many went.
    pub fn retain(&mut self, mut keep: impl FnMut(ZoneId, SlotId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(zone, slot), _| keep(*zone, *slot));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry, by zone then slot.
    #[must_use]
    pub fn records(&self) -> Vec<ZoneDataRecord> {
        self.entries
            .iter()
            .map(|((zone, id), payload)| ZoneDataRecord {
                zone: *zone,
                id: *id,
                zone_data: payload.clone(),
            })
            .collect()
    }
}
