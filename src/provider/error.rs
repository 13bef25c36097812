//! Error types for upstream provider and geocoding-backend calls.

use thiserror::Error;

/// Errors from a single upstream call. Every variant is recovered locally
/// by advancing to the next link of the fallback chain; none of them reach
/// a pipeline caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response doesn't match the provider's documented format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response parsed but contained zero usable pollutant fields.
    #[error("Provider returned no usable data")]
    NoData,
}
