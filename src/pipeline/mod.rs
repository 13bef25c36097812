//! Fallback orchestrator.
//!
//! Top-level state machine for one reading request:
//!
//! `CheckCache → TryPrimary → TryRegional → Synthesize → Persist → Done`
//!
//! A cache hit goes straight to `Done` (the reading is already persisted).
//! The regional step is entered only when the coordinate falls inside the
//! provider's bounding box and a credential is configured. Provider
//! attempts are strictly sequential in chain order: a fallback chain is
//! "try until success", and speculative parallel calls would burn quota on
//! providers likely to be skipped. Each provider gets exactly one attempt
//! per request; the next caller request, gated by the freshness cache, is
//! the retry mechanism.
//!
//! The chain never surfaces an error: total provider failure degrades to
//! synthetic data, and a failed persist is logged while the in-memory
//! reading is still returned. The pipeline holds no mutable state, so two
//! concurrent identical requests may both miss the cache and persist
//! duplicate readings. That race is accepted (duplicates are an additive
//! log and the freshness window bounds the cost).

pub mod cache;

pub use cache::{FreshnessGate, DEFAULT_MAX_AGE_MINUTES, SERVE_MAX_AGE_MINUTES};

use crate::config::AerisConfig;
use crate::provider::{PrimaryProvider, ProviderResult, RegionalProvider};
use crate::reading::{synthetic_reading, CanonicalReading};
use crate::store::ReadingStore;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The acquisition pipeline. One instance serves many concurrent requests;
/// all cross-request state lives in the reading store.
pub struct Pipeline {
    primary: PrimaryProvider,
    /// Present only when a regional credential is configured.
    regional: Option<RegionalProvider>,
    gate: FreshnessGate,
    store: Arc<dyn ReadingStore>,
    max_age_minutes: i64,
    serve_max_age_minutes: i64,
}

impl Pipeline {
    /// Build from config with a shared HTTP client.
    pub fn new(config: &AerisConfig, store: Arc<dyn ReadingStore>, client: Arc<Client>) -> Self {
        let primary = PrimaryProvider::new(
            config.primary.base_url.clone(),
            config.primary.api_key.clone(),
            Duration::from_secs(config.primary.timeout_secs),
            Arc::clone(&client),
        );

        let regional = config.regional.api_key.as_ref().map(|api_key| {
            RegionalProvider::new(
                config.regional.base_url.clone(),
                api_key.clone(),
                config.regional.radius_miles,
                Duration::from_secs(config.regional.timeout_secs),
                Arc::clone(&client),
            )
        });

        Self {
            primary,
            regional,
            gate: FreshnessGate::new(Arc::clone(&store)),
            store,
            max_age_minutes: config.cache.max_age_minutes,
            serve_max_age_minutes: config.cache.serve_max_age_minutes,
        }
    }

    /// Current reading for a coordinate, with the configured general
    /// freshness window. Never fails; total provider failure degrades to
    /// synthetic data.
    pub async fn current_reading(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> CanonicalReading {
        self.current_reading_with_max_age(user_id, latitude, longitude, self.max_age_minutes)
            .await
    }

    /// Reading for a direct-serving endpoint: same chain under the tighter
    /// serve window, since every miss costs an upstream call.
    pub async fn serve_reading(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> CanonicalReading {
        self.current_reading_with_max_age(user_id, latitude, longitude, self.serve_max_age_minutes)
            .await
    }

    /// Same as [`current_reading`](Self::current_reading) with an explicit
    /// freshness window (direct-serving callers pass
    /// [`SERVE_MAX_AGE_MINUTES`]).
    pub async fn current_reading_with_max_age(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        max_age_minutes: i64,
    ) -> CanonicalReading {
        if let Some(cached) = self
            .gate
            .lookup(user_id, latitude, longitude, max_age_minutes)
            .await
        {
            return cached;
        }

        // Capture instant is assigned here, not by the provider.
        let now = Utc::now();
        let reading = self.acquire(latitude, longitude, now).await;
        self.persist(user_id, reading).await
    }

    /// Walk the provider chain in fixed order until one yields usable data.
    async fn acquire(&self, latitude: f64, longitude: f64, now: DateTime<Utc>) -> CanonicalReading {
        match self.primary.fetch(latitude, longitude).await {
            Ok(sample) => match ProviderResult::Primary(sample).into_reading(latitude, longitude, now) {
                Ok(reading) => return reading,
                Err(e) => warn!(error = %e, "primary provider returned no usable data"),
            },
            Err(e) => warn!(error = %e, "primary provider failed"),
        }

        match self
            .regional
            .as_ref()
            .filter(|provider| provider.covers(latitude, longitude))
        {
            Some(provider) => match provider.fetch(latitude, longitude).await {
                Ok(sample) => {
                    match ProviderResult::Regional(sample).into_reading(latitude, longitude, now) {
                        Ok(reading) => return reading,
                        Err(e) => warn!(error = %e, "regional provider returned no usable data"),
                    }
                }
                Err(e) => warn!(error = %e, "regional provider failed"),
            },
            None => debug!(
                lat = latitude,
                lon = longitude,
                "regional provider skipped (unconfigured or outside coverage)"
            ),
        }

        info!(lat = latitude, lon = longitude, "all providers failed, synthesizing reading");
        ProviderResult::Synthetic
            .into_reading(latitude, longitude, now)
            .unwrap_or_else(|_| synthetic_reading(latitude, longitude, now))
    }

    /// Persist and return the stored copy. On a store failure the
    /// in-memory reading is returned anyway, since the numeric answer matters
    /// more than guaranteed persistence for this read-mostly flow.
    async fn persist(&self, user_id: &str, reading: CanonicalReading) -> CanonicalReading {
        match self.store.insert(user_id, reading.clone()).await {
            Ok(stored) => {
                debug!(
                    user_id,
                    source = stored.source.as_str(),
                    aqi = stored.aqi,
                    "reading persisted"
                );
                stored
            }
            Err(e) => {
                warn!(error = %e, user_id, "failed to persist reading, returning unpersisted copy");
                reading
            }
        }
    }
}
