//! Address-to-coordinate resolution.
//!
//! An ordered list of backend services is tried until one returns a usable
//! result (short-circuit: remaining backends are not queried). A backend
//! transport error is logged and skipped; only total exhaustion surfaces
//! an error to the caller.

pub mod backends;

pub use backends::GeocodeBackend;

use crate::config::GeocodingConfig;
use crate::reading::GeoLocation;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Resolution failure, visible to callers. There is no synthetic fallback
/// for an address that does not exist.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Every backend was tried and at least one answered definitively with
    /// zero matches.
    #[error("No geocoding backend matched address: {0}")]
    NotFound(String),

    /// Every backend call itself failed (network, status, parse).
    #[error("All geocoding backends failed, last error: {0}")]
    Resolution(String),
}

/// Walks the configured backends in order.
pub struct GeocodingResolver {
    backends: Vec<GeocodeBackend>,
    timeout: Duration,
    client: Arc<Client>,
}

impl GeocodingResolver {
    /// Build from config: the keyed service first (when a key is
    /// configured), then the free fallback.
    pub fn new(config: &GeocodingConfig, client: Arc<Client>) -> Self {
        let mut backends = Vec::new();
        if let Some(api_key) = &config.primary_api_key {
            backends.push(GeocodeBackend::Keyed {
                base_url: config.primary_base_url.clone(),
                api_key: api_key.clone(),
            });
        }
        backends.push(GeocodeBackend::Open {
            base_url: config.fallback_base_url.clone(),
        });

        Self {
            backends,
            timeout: Duration::from_secs(config.timeout_secs),
            client,
        }
    }

    #[cfg(test)]
    fn with_backends(backends: Vec<GeocodeBackend>, client: Arc<Client>) -> Self {
        Self {
            backends,
            timeout: Duration::from_secs(5),
            client,
        }
    }

    /// Resolve a free-text address into coordinates.
    pub async fn resolve(&self, address: &str) -> Result<GeoLocation, GeocodeError> {
        let mut last_error: Option<String> = None;
        let mut any_answered = false;

        for backend in &self.backends {
            match backend.lookup(&self.client, self.timeout, address).await {
                Ok(Some(location)) => {
                    debug!(
                        backend = backend.name(),
                        label = %location.label,
                        "address resolved"
                    );
                    return Ok(location);
                }
                Ok(None) => {
                    any_answered = true;
                    debug!(backend = backend.name(), address, "no match, trying next backend");
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "geocoding backend failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        match last_error {
            Some(error) if !any_answered => Err(GeocodeError::Resolution(error)),
            _ => Err(GeocodeError::NotFound(address.to_string())),
        }
    }
}
