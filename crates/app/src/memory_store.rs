//! Volatile [`ByteStore`] for tests and diskless runs.

use std::collections::HashMap;
use std::sync::Mutex;

use zonealarm_domain::error::ZoneAlarmError;

use crate::ports::ByteStore;

/// Keeps every key in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryByteStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryByteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current bytes under `key`, without going through the port.
    #[must_use]
    pub fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
        self.entries().get(key).cloned()
    }
}

impl ByteStore for InMemoryByteStore {
    async fn read_all(&self, key: &str) -> Result<Option<Vec<u8>>, ZoneAlarmError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn write_all(&self, key: &str, bytes: Vec<u8>) -> Result<(), ZoneAlarmError> {
        self.entries().insert(key.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_return_none_for_unknown_key() {
        let store = InMemoryByteStore::new();
        assert_eq!(store.read_all("alarms").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_replace_whole_value_on_write() {
        let store = InMemoryByteStore::new();
        store.write_all("alarms", b"[1,2,3]".to_vec()).await.unwrap();
        store.write_all("alarms", b"[]".to_vec()).await.unwrap();
        assert_eq!(store.read_all("alarms").await.unwrap(), Some(b"[]".to_vec()));
        assert_eq!(store.snapshot("alarms"), Some(b"[]".to_vec()));
    }
}
