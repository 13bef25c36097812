//! Freshness gate over the reading store.
//!
//! Exists purely to bound upstream call volume and API cost. It is a
//! cost optimization, not a consistency mechanism. Two concurrent
//! identical requests may both miss and both call upstream; the duplicate
//! persisted readings are harmless and the freshness window bounds the
//! damage. No locking.

use crate::reading::CanonicalReading;
use crate::store::ReadingStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default freshness window for general queries, in minutes.
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 30;

/// Tighter window for direct-serving endpoints that hit an upstream
/// provider on every miss.
pub const SERVE_MAX_AGE_MINUTES: i64 = 10;

pub struct FreshnessGate {
    store: Arc<dyn ReadingStore>,
}

impl FreshnessGate {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Return a sufficiently recent reading for the exact (user, lat, lon)
    /// key, or `None`. A store error counts as a miss, so the chain can
    /// always fall through to the providers.
    pub async fn lookup(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        max_age_minutes: i64,
    ) -> Option<CanonicalReading> {
        debug_assert!(max_age_minutes > 0);

        match self
            .store
            .find_recent(user_id, latitude, longitude, max_age_minutes)
            .await
        {
            Ok(Some(reading)) => {
                info!(
                    user_id,
                    lat = latitude,
                    lon = longitude,
                    max_age_minutes,
                    "cache hit, skipping provider chain"
                );
                Some(reading)
            }
            Ok(None) => {
                debug!(user_id, lat = latitude, lon = longitude, "cache miss");
                None
            }
            Err(e) => {
                warn!(error = %e, "freshness lookup failed, treating as miss");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{CanonicalReading, Source};
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_gate_hit_and_miss_by_window() {
        let store = Arc::new(MemoryStore::new());
        let timestamp = Utc::now() - Duration::minutes(5);
        let reading =
            CanonicalReading::new(40.7, -74.0, Source::PrimaryProvider, timestamp).with_aqi(60);
        store.insert("user-1", reading).await.unwrap();

        let gate = FreshnessGate::new(store);
        assert!(gate.lookup("user-1", 40.7, -74.0, 30).await.is_some());
        assert!(gate.lookup("user-1", 40.7, -74.0, 3).await.is_none());
    }

    #[tokio::test]
    async fn test_gate_miss_on_empty_store() {
        let gate = FreshnessGate::new(Arc::new(MemoryStore::new()));
        assert!(gate.lookup("user-1", 40.7, -74.0, 30).await.is_none());
    }
}
