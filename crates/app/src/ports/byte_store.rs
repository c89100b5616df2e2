//! Byte store port: durable key to bytes mapping holding the snapshots.

use std::future::Future;

use zonealarm_domain::error::ZoneAlarmError;

/// Whole-value storage: every write replaces the previous contents of the key.
pub trait ByteStore {
    /// Read everything stored under `key`, or `None` if nothing was ever written.
    fn read_all(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ZoneAlarmError>> + Send;

    /// Replace the contents of `key` with `bytes`.
    fn write_all(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), ZoneAlarmError>> + Send;
}

impl<T: ByteStore + Send + Sync> ByteStore for std::sync::Arc<T> {
    fn read_all(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ZoneAlarmError>> + Send {
        (**self).read_all(key)
    }

    fn write_all(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), ZoneAlarmError>> + Send {
        (**self).write_all(key, bytes)
    }
}
