//! Last-resort synthetic reading.
//!
//! Invoked only when every real provider fails or is inapplicable for the
//! queried region. The payload is a fixed set of demo constants, never
//! random, so repeated synthetic reads are deterministic and testable.

use chrono::{DateTime, Utc};

use super::{dominant_pollutant, CanonicalReading, Concentrations, Source};

pub const SYNTHETIC_PM2_5: f64 = 12.0;
pub const SYNTHETIC_PM10: f64 = 25.0;
pub const SYNTHETIC_O3: f64 = 30.0;
pub const SYNTHETIC_NO2: f64 = 20.0;
pub const SYNTHETIC_AQI: u16 = 42;

/// Fixed demo reading echoing the requested coordinates. Pure function of
/// (lat, lon, timestamp); pollutant values are location-independent.
pub fn synthetic_reading(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> CanonicalReading {
    let concentrations = Concentrations {
        pm2_5: Some(SYNTHETIC_PM2_5),
        pm10: Some(SYNTHETIC_PM10),
        o3: Some(SYNTHETIC_O3),
        no2: Some(SYNTHETIC_NO2),
    };
    let mut reading =
        CanonicalReading::new(latitude, longitude, Source::Synthetic, timestamp).with_aqi(SYNTHETIC_AQI);
    reading.dominant_pollutant = dominant_pollutant(&concentrations);
    reading.concentrations = concentrations;
    reading
}
