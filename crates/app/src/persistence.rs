//! Persistence manager: whole snapshots of the registry and the zone data
//! store, written to a [`ByteStore`].
//!
//! Alarms and payloads live under separate keys and are always rewritten in
//! full. Loading replays every alarm record through the same validated add
//! path the protocol uses, so one bad record is rejected on its own.

use serde::Serialize;
use serde_json::Value;

use zonealarm_domain::alarm::AlarmRecord;
use zonealarm_domain::error::ZoneAlarmError;
use zonealarm_domain::registry::AlarmRegistry;
use zonealarm_domain::zone_data::{ZoneDataRecord, ZoneDataStore};

use crate::ports::ByteStore;

/// Key of the alarm collection.
pub const ALARMS_KEY: &str = "alarms";

/// Key of the zone data collection.
pub const ZONE_DATA_KEY: &str = "zone_data";

/// A record that could not be restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Which collection the record came from.
    pub key: &'static str,
    /// Position in the stored list, or `None` when the whole collection
    /// was unreadable.
    pub index: Option<usize>,
    pub reason: String,
}

/// What a load restored and what it had to leave behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub restored: usize,
    pub zone_data_restored: usize,
    /// Payloads whose alarm did not survive the load.
    pub orphaned: usize,
    pub rejected: Vec<RejectedRecord>,
}

/// Saves and loads snapshots through a [`ByteStore`].
pub struct PersistenceManager<B> {
    store: B,
}

impl<B: ByteStore> PersistenceManager<B> {
    pub fn new(store: B) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Write both collections, alarms first.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::Storage`] when serialization or a write fails.
    /// The alarm collection may already be written when the payload write fails.
    pub async fn save(
        &self,
        registry: &AlarmRegistry,
        zone_data: &ZoneDataStore,
    ) -> Result<(), ZoneAlarmError> {
        self.store
            .write_all(ALARMS_KEY, encode(&registry.list())?)
            .await?;
        self.store
            .write_all(ZONE_DATA_KEY, encode(&zone_data.records())?)
            .await?;
        Ok(())
    }

    /// Clear `registry` and `zone_data`, then rebuild them from the store.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneAlarmError::Storage`] when the alarm collection cannot be
    /// read or is not a JSON list. An unreadable zone data collection only
    /// loses the payloads: it is reported in [`LoadReport::rejected`] and the
    /// restored alarms are kept.
    pub async fn load(
        &self,
        registry: &mut AlarmRegistry,
        zone_data: &mut ZoneDataStore,
    ) -> Result<LoadReport, ZoneAlarmError> {
        registry.clear();
        zone_data.clear();
        let mut report = LoadReport::default();

        for (index, value) in self.read_list(ALARMS_KEY).await?.into_iter().enumerate() {
            let restored = serde_json::from_value::<AlarmRecord>(value)
                .map_err(|err| err.to_string())
                .and_then(|record| {
                    registry
                        .restore(record.zone, record.id, &record.draft)
                        .map_err(|err| err.to_string())
                });
            match restored {
                Ok(insertion) => {
                    if !insertion.evicted.is_empty() {
                        tracing::warn!(
                            index,
                            evicted = insertion.evicted.len(),
                            "stored alarm replaced an earlier one with the same time"
                        );
                    }
                }
                Err(reason) => report.reject(ALARMS_KEY, Some(index), reason),
            }
        }
        report.restored = registry.len();

        let payloads = match self.read_list(ZONE_DATA_KEY).await {
            Ok(payloads) => payloads,
            Err(err) => {
                report.reject(ZONE_DATA_KEY, None, err.to_string());
                Vec::new()
            }
        };
        for (index, value) in payloads.into_iter().enumerate() {
            match serde_json::from_value::<ZoneDataRecord>(value) {
                Ok(record) if registry.contains(record.zone, record.id) => {
                    zone_data.put(record.zone, record.id, record.zone_data);
                    report.zone_data_restored += 1;
                }
                Ok(record) => {
                    tracing::debug!(zone = %record.zone, slot = %record.id, "dropping orphaned zone data");
                    report.orphaned += 1;
                }
                Err(err) => report.reject(ZONE_DATA_KEY, Some(index), err.to_string()),
            }
        }

        Ok(report)
    }

    async fn read_list(&self, key: &'static str) -> Result<Vec<Value>, ZoneAlarmError> {
        match self.store.read_all(key).await? {
            None => Ok(Vec::new()),
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(storage_error),
        }
    }
}

impl LoadReport {
    fn reject(&mut self, key: &'static str, index: Option<usize>, reason: String) {
        tracing::warn!(key, ?index, %reason, "rejected stored record");
        self.rejected.push(RejectedRecord { key, index, reason });
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ZoneAlarmError> {
    serde_json::to_vec(value).map_err(storage_error)
}

fn storage_error(err: serde_json::Error) -> ZoneAlarmError {
    ZoneAlarmError::Storage(Box::new(err))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use zonealarm_domain::alarm::AlarmDraft;
    use zonealarm_domain::id::{SlotId, ZoneId};
    use zonealarm_domain::zone_data::ZoneDataPayload;

    use super::*;
    use crate::memory_store::InMemoryByteStore;

    fn zone(n: i64) -> ZoneId {
        ZoneId::new(n).unwrap()
    }

    fn slot(n: i64) -> SlotId {
        SlotId::new(n).unwrap()
    }

    fn manager() -> (PersistenceManager<Arc<InMemoryByteStore>>, Arc<InMemoryByteStore>) {
        let store = Arc::new(InMemoryByteStore::new());
        (PersistenceManager::new(Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn should_round_trip_alarms_and_payloads() {
        let (manager, _) = manager();
        let mut registry = AlarmRegistry::new();
        let mut data = ZoneDataStore::new();
        registry
            .add(zone(1), &AlarmDraft::weekly(["mon", "wed"], "08:30", "ON"))
            .unwrap();
        registry
            .restore(zone(3), slot(4), &AlarmDraft::calendar("2025-12-25", false, "09:00", "OFF"))
            .unwrap();
        data.put(zone(3), slot(4), ZoneDataPayload::new(json!({"x": 1})).unwrap());
        let before = registry.list();

        manager.save(&registry, &data).await.unwrap();
        registry.clear();
        data.clear();
        let report = manager.load(&mut registry, &mut data).await.unwrap();

        assert_eq!(registry.list(), before);
        assert_eq!(report.restored, 2);
        assert_eq!(report.zone_data_restored, 1);
        assert_eq!(data.get(zone(3), slot(4)).unwrap().to_value(), json!({"x": 1}));
        assert!(report.rejected.is_empty());
    }

    #[tokio::test]
    async fn should_load_empty_when_nothing_was_saved() {
        let (manager, _) = manager();
        let mut registry = AlarmRegistry::new();
        registry
            .add(zone(1), &AlarmDraft::weekly(["mon"], "08:30", "ON"))
            .unwrap();
        let mut data = ZoneDataStore::new();

        let report = manager.load(&mut registry, &mut data).await.unwrap();

        assert_eq!(report, LoadReport::default());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn should_reject_bad_records_individually() {
        let (manager, store) = manager();
        let alarms = json!([
            {"zone": 1, "id": 0, "type": "day", "time": "08:30", "action": "ON", "days": ["mon"]},
            {"zone": 1, "id": 1, "type": "day", "time": "99:99", "action": "ON", "days": ["mon"]},
            {"zone": 9, "id": 0, "type": "day", "time": "07:00", "action": "ON", "days": ["mon"]},
            "garbage",
            {"callback": 2, "id": 3, "type": "date", "date": "2025-06-20", "oneTime": true, "time": "15:00", "action": "OFF"}
        ]);
        store
            .write_all(ALARMS_KEY, serde_json::to_vec(&alarms).unwrap())
            .await
            .unwrap();
        let mut registry = AlarmRegistry::new();
        let mut data = ZoneDataStore::new();

        let report = manager.load(&mut registry, &mut data).await.unwrap();

        assert_eq!(report.restored, 2);
        let rejected: Vec<Option<usize>> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![Some(1), Some(2), Some(3)]);
        assert!(registry.contains(zone(2), slot(3)));
    }

    #[tokio::test]
    async fn should_drop_orphaned_zone_data() {
        let (manager, store) = manager();
        store
            .write_all(
                ZONE_DATA_KEY,
                serde_json::to_vec(&json!([{"zone": 1, "id": 5, "zone_data": {"a": 1}}])).unwrap(),
            )
            .await
            .unwrap();
        let mut registry = AlarmRegistry::new();
        let mut data = ZoneDataStore::new();

        let report = manager.load(&mut registry, &mut data).await.unwrap();

        assert_eq!(report.orphaned, 1);
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn should_fail_load_when_collection_is_not_a_list() {
        let (manager, store) = manager();
        store.write_all(ALARMS_KEY, b"{not json".to_vec()).await.unwrap();
        let mut registry = AlarmRegistry::new();
        let mut data = ZoneDataStore::new();

        let result = manager.load(&mut registry, &mut data).await;

        assert!(matches!(result, Err(ZoneAlarmError::Storage(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn should_keep_alarms_when_only_zone_data_is_corrupt() {
        let (manager, store) = manager();
        let mut registry = AlarmRegistry::new();
        let mut data = ZoneDataStore::new();
        registry
            .add(zone(1), &AlarmDraft::weekly(["mon"], "08:30", "ON"))
            .unwrap();
        registry
            .add(zone(2), &AlarmDraft::weekly(["tue"], "09:00", "OFF"))
            .unwrap();
        manager.save(&registry, &data).await.unwrap();
        store.write_all(ZONE_DATA_KEY, b"[{trunc".to_vec()).await.unwrap();

        let report = manager.load(&mut registry, &mut data).await.unwrap();

        assert_eq!(report.restored, 2);
        assert_eq!(registry.len(), 2);
        assert!(data.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].key, ZONE_DATA_KEY);
        assert_eq!(report.rejected[0].index, None);
    }

    #[tokio::test]
    async fn should_write_list_shape_with_zone_tag() {
        let (manager, store) = manager();
        let mut registry = AlarmRegistry::new();
        registry
            .add(zone(4), &AlarmDraft::weekly(["fri"], "18:00", "OFF"))
            .unwrap();

        manager.save(&registry, &ZoneDataStore::new()).await.unwrap();

        let saved: Value = serde_json::from_slice(&store.snapshot(ALARMS_KEY).unwrap()).unwrap();
        assert_eq!(saved[0]["zone"], 4);
        assert_eq!(saved[0]["days"], json!(["fri"]));
        assert_eq!(store.snapshot(ZONE_DATA_KEY), Some(b"[]".to_vec()));
    }
}
