//! Upstream providers and their normalizers.
//!
//! Each provider is a concrete fetcher returning its own wire sample; the
//! samples are carried as variants of [`ProviderResult`] and normalized by
//! one exhaustive match. The chain is fixed-order and small by design; no
//! provider plugin system.

pub mod error;
pub mod primary;
pub mod regional;

pub use error::ProviderError;
pub use primary::{PrimaryProvider, PrimarySample};
pub use regional::{RegionalProvider, RegionalSample};

use crate::reading::{synthetic_reading, CanonicalReading};
use chrono::{DateTime, Utc};

/// Raw outcome of one link of the fallback chain, before normalization.
#[derive(Debug, Clone)]
pub enum ProviderResult {
    Primary(PrimarySample),
    Regional(RegionalSample),
    Synthetic,
}

impl ProviderResult {
    /// Normalize into a canonical reading. `Primary` and `Regional` samples
    /// with zero usable pollutant fields fail with
    /// [`ProviderError::NoData`]; `Synthetic` never fails.
    pub fn into_reading(
        self,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<CanonicalReading, ProviderError> {
        match self {
            ProviderResult::Primary(sample) => primary::normalize(sample, latitude, longitude, timestamp),
            ProviderResult::Regional(sample) => {
                regional::normalize(sample, latitude, longitude, timestamp)
            }
            ProviderResult::Synthetic => Ok(synthetic_reading(latitude, longitude, timestamp)),
        }
    }
}
