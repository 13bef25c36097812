//! Regional air quality provider.
//!
//! Reports AQI and category per pollutant directly from the nearest
//! monitoring station, so no ordinal mapping is needed. Coverage is
//! restricted to a fixed bounding box over its country of origin; the
//! orchestrator must not invoke it outside that box. The overall AQI is
//! the maximum per-pollutant AQI, and the pollutant that produced it is
//! the dominant one. The provider's own per-pollutant AQI is
//! authoritative, so the severity-ratio method is not used here.

use super::ProviderError;
use crate::reading::{CanonicalReading, Pollutant, Source};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Continental-US coverage rectangle.
const LAT_MIN: f64 = 24.5;
const LAT_MAX: f64 = 49.5;
const LON_MIN: f64 = -125.0;
const LON_MAX: f64 = -66.9;

/// Client for the regional provider's current-observation endpoint.
pub struct RegionalProvider {
    base_url: String,
    api_key: String,
    radius_miles: u32,
    timeout: Duration,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

/// One station observation: `{ ParameterName, AQI, Category: { Name }, Value, Unit }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(rename = "ParameterName")]
    pub parameter: String,
    #[serde(rename = "AQI")]
    pub aqi: i32,
    #[serde(rename = "Category", default)]
    pub category: Option<ObservationCategory>,
    #[serde(rename = "Value", default)]
    pub value: Option<f64>,
    #[serde(rename = "Unit", default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationCategory {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Observation array for the nearest station, plus the untouched payload.
#[derive(Debug, Clone)]
pub struct RegionalSample {
    pub observations: Vec<Observation>,
    pub raw: serde_json::Value,
}

impl RegionalProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        radius_miles: u32,
        timeout: Duration,
        client: Arc<Client>,
    ) -> Self {
        Self {
            base_url,
            api_key,
            radius_miles,
            timeout,
            client,
        }
    }

    /// Whether a coordinate falls inside the provider's coverage rectangle.
    pub fn covers(&self, latitude: f64, longitude: f64) -> bool {
        (LAT_MIN..=LAT_MAX).contains(&latitude) && (LON_MIN..=LON_MAX).contains(&longitude)
    }

    /// Fetch current observations for a coordinate. Coordinates are rounded
    /// to 4 decimals in the request, per the provider's wire contract.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<RegionalSample, ProviderError> {
        let url = format!("{}/aq/observation/latLong/current/", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "application/json".to_string()),
                ("latitude", format!("{:.4}", latitude)),
                ("longitude", format!("{:.4}", longitude)),
                ("distance", self.radius_miles.to_string()),
                ("API_KEY", self.api_key.clone()),
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

        let observations: Vec<Observation> = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::InvalidResponse(format!("Unexpected response shape: {}", e)))?;

        debug!(
            count = observations.len(),
            lat = latitude,
            lon = longitude,
            "regional provider observations received"
        );

        Ok(RegionalSample { observations, raw })
    }
}

fn parse_parameter(name: &str) -> Option<Pollutant> {
    match name.to_ascii_uppercase().as_str() {
        "PM2.5" => Some(Pollutant::Pm25),
        "PM10" => Some(Pollutant::Pm10),
        "O3" | "OZONE" => Some(Pollutant::O3),
        "NO2" => Some(Pollutant::No2),
        _ => None,
    }
}

/// Normalize a regional sample into a canonical reading.
///
/// Unknown parameters and sentinel AQI values (negative, used by the
/// provider for "unreported") are excluded. Zero usable observations is a
/// failure (`NoData`), not a valid empty reading.
pub fn normalize(
    sample: RegionalSample,
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
) -> Result<CanonicalReading, ProviderError> {
    let mut reading = CanonicalReading::new(latitude, longitude, Source::RegionalProvider, timestamp);
    let mut max: Option<(Pollutant, u16)> = None;

    for obs in &sample.observations {
        let Some(pollutant) = parse_parameter(&obs.parameter) else {
            continue;
        };
        if obs.aqi < 0 {
            continue;
        }
        let aqi = obs.aqi as u16;
        if let Some(value) = obs.value {
            reading.concentrations.set(pollutant, value);
        }
        // Strictly-greater keeps the first pollutant on equal AQI.
        if max.map_or(true, |(_, best)| aqi > best) {
            max = Some((pollutant, aqi));
        }
    }

    let (dominant, aqi) = max.ok_or(ProviderError::NoData)?;
    reading = reading.with_aqi(aqi);
    reading.dominant_pollutant = Some(dominant);
    reading.raw_payload = Some(sample.raw);
    Ok(reading)
}
