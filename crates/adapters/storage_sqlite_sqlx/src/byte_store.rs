//! `SQLite` implementation of [`ByteStore`].

use std::future::Future;

use sqlx::SqlitePool;

use zonealarm_app::ports::ByteStore;
use zonealarm_domain::error::ZoneAlarmError;

use crate::error::StorageError;

const SELECT_BY_KEY: &str = "SELECT value FROM byte_store WHERE key = ?";
const UPSERT: &str = "INSERT INTO byte_store (key, value, updated_at) VALUES (?, ?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// `SQLite`-backed byte store, one row per key.
#[derive(Clone)]
pub struct SqliteByteStore {
    pool: SqlitePool,
}

impl SqliteByteStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ByteStore for SqliteByteStore {
    fn read_all(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ZoneAlarmError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        async move {
            let row: Option<(Vec<u8>,)> = sqlx::query_as(SELECT_BY_KEY)
                .bind(&key)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn write_all(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), ZoneAlarmError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        async move {
            sqlx::query(UPSERT)
                .bind(&key)
                .bind(bytes)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
