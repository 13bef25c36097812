//! Primary (global) air quality provider.
//!
//! Reports a coarse ordinal index (1–5) plus pollutant concentrations.
//! Queried first in the fallback chain because it has global coverage.
//! The ordinal maps onto the standard 0–500 AQI scale via a fixed lookup
//! (upper bound of each band); the dominant pollutant is derived from the
//! concentration map with the severity-ratio method.

use super::ProviderError;
use crate::reading::{dominant_pollutant, CanonicalReading, Concentrations, Source};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Client for the global provider's current air pollution endpoint.
pub struct PrimaryProvider {
    base_url: String,
    api_key: String,
    timeout: Duration,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

/// Wire format: `{ "list": [ { "main": { "aqi": 1..5 }, "components": {...} } ] }`.
#[derive(Deserialize)]
struct AirPollutionResponse {
    #[serde(default)]
    list: Vec<AirPollutionEntry>,
}

#[derive(Deserialize)]
struct AirPollutionEntry {
    main: AirPollutionIndex,
    #[serde(default)]
    components: Concentrations,
}

#[derive(Deserialize)]
struct AirPollutionIndex {
    aqi: u8,
}

/// First entry of the provider's reading list, plus the untouched payload.
#[derive(Debug, Clone)]
pub struct PrimarySample {
    pub aqi_ordinal: u8,
    pub components: Concentrations,
    pub raw: serde_json::Value,
}

impl PrimaryProvider {
    pub fn new(base_url: String, api_key: String, timeout: Duration, client: Arc<Client>) -> Self {
        Self {
            base_url,
            api_key,
            timeout,
            client,
        }
    }

    /// Fetch the current sample for a coordinate. One attempt, bounded
    /// timeout; a timeout is reported as [`ProviderError::Timeout`] and is
    /// treated identically to any other failure by the caller.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<PrimarySample, ProviderError> {
        let url = format!("{}/data/2.5/air_pollution", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout_ms)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response body: {}", e)))?;

        let parsed: AirPollutionResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::InvalidResponse(format!("Unexpected response shape: {}", e)))?;

        let entry = parsed.list.into_iter().next().ok_or(ProviderError::NoData)?;

        debug!(
            ordinal = entry.main.aqi,
            lat = latitude,
            lon = longitude,
            "primary provider sample received"
        );

        Ok(PrimarySample {
            aqi_ordinal: entry.main.aqi,
            components: entry.components,
            raw,
        })
    }
}

/// Ordinal 1–5 → standard AQI (upper bound of each band).
fn ordinal_to_aqi(ordinal: u8) -> Option<u16> {
    match ordinal {
        1 => Some(50),
        2 => Some(100),
        3 => Some(150),
        4 => Some(200),
        5 => Some(300),
        _ => None,
    }
}

/// Normalize a primary sample into a canonical reading.
///
/// A sample with zero usable pollutant fields is a failure (`NoData`), not
/// a valid empty reading, and the chain continues to the next provider.
pub fn normalize(
    sample: PrimarySample,
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
) -> Result<CanonicalReading, ProviderError> {
    if sample.components.is_empty() {
        return Err(ProviderError::NoData);
    }

    let aqi = ordinal_to_aqi(sample.aqi_ordinal).ok_or_else(|| {
        ProviderError::InvalidResponse(format!("ordinal AQI out of range: {}", sample.aqi_ordinal))
    })?;

    let mut reading =
        CanonicalReading::new(latitude, longitude, Source::PrimaryProvider, timestamp).with_aqi(aqi);
    reading.dominant_pollutant = dominant_pollutant(&sample.components);
    reading.concentrations = sample.components;
    reading.raw_payload = Some(sample.raw);
    Ok(reading)
}
