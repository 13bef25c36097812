//! Reading store contract.
//!
//! The durable store is an external collaborator; this crate consumes it
//! only through the narrow [`ReadingStore`] contract. [`MemoryStore`] is
//! the in-process implementation used by tests and demos.

use crate::reading::CanonicalReading;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors from the storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend rejected write: {0}")]
    Rejected(String),
}

/// Narrow read/write contract over the durable reading store.
///
/// Cache keys are exact: two lookups share a hit only when `user_id`
/// matches and both coordinates compare equal as `f64`, with no rounding or
/// geohash bucketing. Requests metres apart therefore never share a cache
/// entry; that precision gap is deliberate and must not be "fixed" here
/// without changing observable caching behavior.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn ReadingStore>`.
#[async_trait]
pub trait ReadingStore: Send + Sync + 'static {
    /// Most recent reading for the exact (user, lat, lon) key with a
    /// timestamp newer than `now − max_age_minutes`, or `None`.
    async fn find_recent(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        max_age_minutes: i64,
    ) -> Result<Option<CanonicalReading>, StoreError>;

    /// Persist a reading for a user. Returns the stored copy with the
    /// store-assigned identifier.
    async fn insert(
        &self,
        user_id: &str,
        reading: CanonicalReading,
    ) -> Result<CanonicalReading, StoreError>;
}

struct StoredRow {
    user_id: String,
    reading: CanonicalReading,
}

/// In-memory store. Duplicate rows for the same key are allowed; the
/// pipeline's accepted cache race produces them and they are harmless.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<StoredRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn find_recent(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        max_age_minutes: i64,
    ) -> Result<Option<CanonicalReading>, StoreError> {
        let cutoff = Utc::now() - Duration::minutes(max_age_minutes);
        let rows = self.rows.read().await;

        let best = rows
            .iter()
            .filter(|row| {
                row.user_id == user_id
                    && row.reading.latitude == latitude
                    && row.reading.longitude == longitude
                    && row.reading.timestamp > cutoff
            })
            .max_by_key(|row| row.reading.timestamp)
            .map(|row| row.reading.clone());

        Ok(best)
    }

    async fn insert(
        &self,
        user_id: &str,
        mut reading: CanonicalReading,
    ) -> Result<CanonicalReading, StoreError> {
        reading.id = Some(Uuid::new_v4());
        let stored = reading.clone();
        self.rows.write().await.push(StoredRow {
            user_id: user_id.to_string(),
            reading,
        });
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Source;

    fn reading_at(lat: f64, lon: f64, minutes_ago: i64) -> CanonicalReading {
        let timestamp = Utc::now() - Duration::minutes(minutes_ago);
        CanonicalReading::new(lat, lon, Source::PrimaryProvider, timestamp).with_aqi(75)
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryStore::new();
        let stored = store
            .insert("user-1", reading_at(40.7, -74.0, 0))
            .await
            .unwrap();
        assert!(stored.id.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_recent_within_window() {
        let store = MemoryStore::new();
        store
            .insert("user-1", reading_at(40.7, -74.0, 5))
            .await
            .unwrap();

        let hit = store.find_recent("user-1", 40.7, -74.0, 30).await.unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_find_recent_outside_window() {
        let store = MemoryStore::new();
        store
            .insert("user-1", reading_at(40.7, -74.0, 5))
            .await
            .unwrap();

        let miss = store.find_recent("user-1", 40.7, -74.0, 3).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_find_recent_exact_key_match_only() {
        let store = MemoryStore::new();
        store
            .insert("user-1", reading_at(40.7, -74.0, 1))
            .await
            .unwrap();

        // Different user
        assert!(store
            .find_recent("user-2", 40.7, -74.0, 30)
            .await
            .unwrap()
            .is_none());
        // Coordinate off by a hair's width
        assert!(store
            .find_recent("user-1", 40.700001, -74.0, 30)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_recent_returns_most_recent() {
        let store = MemoryStore::new();
        store
            .insert("user-1", reading_at(40.7, -74.0, 20))
            .await
            .unwrap();
        let newer = store
            .insert("user-1", reading_at(40.7, -74.0, 2))
            .await
            .unwrap();
        store
            .insert("user-1", reading_at(40.7, -74.0, 10))
            .await
            .unwrap();

        let hit = store
            .find_recent("user-1", 40.7, -74.0, 30)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, newer.id);
    }
}
