//! Geocoding backend services.
//!
//! Two wire formats, one internal shape: the keyed service returns a bare
//! array of `{ lat, lon, display_name }` with string coordinates; the free
//! fallback wraps `{ latitude, longitude, name }` objects in a `results`
//! array. Both are normalized to [`GeoLocation`] here.

use crate::provider::ProviderError;
use crate::reading::GeoLocation;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// One configured backend, tried in resolver order.
#[derive(Debug, Clone)]
pub enum GeocodeBackend {
    /// Key-authenticated service, tried first.
    Keyed { base_url: String, api_key: String },
    /// Free unauthenticated fallback.
    Open { base_url: String },
}

/// Keyed service result: coordinates arrive as strings.
#[derive(Deserialize)]
struct KeyedResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct OpenResponse {
    #[serde(default)]
    results: Vec<OpenResult>,
}

#[derive(Deserialize)]
struct OpenResult {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    name: Option<String>,
}

impl GeocodeBackend {
    pub fn name(&self) -> &'static str {
        match self {
            GeocodeBackend::Keyed { .. } => "keyed",
            GeocodeBackend::Open { .. } => "open",
        }
    }

    /// Look up an address. `Ok(None)` means the backend answered
    /// definitively with zero matches; `Err` means the call itself failed.
    pub(crate) async fn lookup(
        &self,
        client: &Client,
        timeout: Duration,
        address: &str,
    ) -> Result<Option<GeoLocation>, ProviderError> {
        let timeout_ms = timeout.as_millis() as u64;

        let request = match self {
            GeocodeBackend::Keyed { base_url, api_key } => client
                .get(format!("{}/v1/search", base_url))
                .query(&[
                    ("key", api_key.as_str()),
                    ("q", address),
                    ("format", "json"),
                    ("limit", "1"),
                ]),
            GeocodeBackend::Open { base_url } => client
                .get(format!("{}/v1/search", base_url))
                .query(&[("name", address), ("count", "1")]),
        };

        let response = request.timeout(timeout).send().await.map_err(|e| {
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

        match self {
            GeocodeBackend::Keyed { .. } => {
                let results: Vec<KeyedResult> = response.json().await.map_err(|e| {
                    ProviderError::InvalidResponse(format!("Unexpected response shape: {}", e))
                })?;
                let Some(first) = results.into_iter().next() else {
                    return Ok(None);
                };
                let latitude: f64 = first.lat.parse().map_err(|_| {
                    ProviderError::InvalidResponse(format!("non-numeric latitude: {}", first.lat))
                })?;
                let longitude: f64 = first.lon.parse().map_err(|_| {
                    ProviderError::InvalidResponse(format!("non-numeric longitude: {}", first.lon))
                })?;
                Ok(Some(GeoLocation {
                    latitude,
                    longitude,
                    label: first.display_name.unwrap_or_else(|| address.to_string()),
                }))
            }
            GeocodeBackend::Open { .. } => {
                let parsed: OpenResponse = response.json().await.map_err(|e| {
                    ProviderError::InvalidResponse(format!("Unexpected response shape: {}", e))
                })?;
                let Some(first) = parsed.results.into_iter().next() else {
                    return Ok(None);
                };
                Ok(Some(GeoLocation {
                    latitude: first.latitude,
                    longitude: first.longitude,
                    label: first.name.unwrap_or_else(|| address.to_string()),
                }))
            }
        }
    }
}
