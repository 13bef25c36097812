//! Canonical reading model.
//!
//! Every upstream provider response is normalized into [`CanonicalReading`];
//! downstream code never sees a provider wire format. Readings are plain
//! value objects; the reading store owns the durable copy once persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod category;
pub mod synthetic;

pub use category::{category_for, dominant_pollutant, Category};
pub use synthetic::synthetic_reading;

/// Which link of the fallback chain produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    PrimaryProvider,
    RegionalProvider,
    Synthetic,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PrimaryProvider => "primary-provider",
            Source::RegionalProvider => "regional-provider",
            Source::Synthetic => "synthetic",
        }
    }
}

/// Monitored pollutants. Declaration order is the tie-break order for
/// dominant-pollutant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "NO2")]
    No2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::No2 => "NO2",
        }
    }

    /// Reference concentration used for severity ratios (value / reference).
    /// Particulates in µg/m³, O₃ and NO₂ in provider-native units.
    pub fn reference(&self) -> f64 {
        match self {
            Pollutant::Pm25 => 12.0,
            Pollutant::Pm10 => 54.0,
            Pollutant::O3 => 70.0,
            Pollutant::No2 => 100.0,
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-pollutant concentrations. A provider may not report all of them;
/// absent means unreported, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Concentrations {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
}

impl Concentrations {
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::O3 => self.o3,
            Pollutant::No2 => self.no2,
        }
    }

    pub fn set(&mut self, pollutant: Pollutant, value: f64) {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5 = Some(value),
            Pollutant::Pm10 => self.pm10 = Some(value),
            Pollutant::O3 => self.o3 = Some(value),
            Pollutant::No2 => self.no2 = Some(value),
        }
    }

    /// Present pollutants in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// The normalized unit of output for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReading {
    /// Store-assigned identifier; `None` until persisted.
    pub id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    /// Capture instant, assigned by the orchestrator at fetch time.
    pub timestamp: DateTime<Utc>,
    pub concentrations: Concentrations,
    /// 0–500 scale; `None` if no provider supplied enough data.
    pub aqi: Option<u16>,
    pub category: Option<Category>,
    pub dominant_pollutant: Option<Pollutant>,
    pub source: Source,
    /// Opaque copy of the original provider response, kept for audit only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<serde_json::Value>,
}

impl CanonicalReading {
    pub fn new(latitude: f64, longitude: f64, source: Source, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            latitude,
            longitude,
            timestamp,
            concentrations: Concentrations::default(),
            aqi: None,
            category: None,
            dominant_pollutant: None,
            source,
            raw_payload: None,
        }
    }

    /// Set `aqi` and the matching `category` together. The two fields are
    /// never written independently anywhere in the crate.
    pub fn with_aqi(mut self, aqi: u16) -> Self {
        self.aqi = Some(aqi);
        self.category = Some(category_for(aqi));
        self
    }
}

/// Result of resolving a free-text address. Constructed fresh per
/// resolution call, never mutated, not persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Resolved display name; falls back to the original query string when
    /// the backend returns none.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_as_str() {
        assert_eq!(Source::PrimaryProvider.as_str(), "primary-provider");
        assert_eq!(Source::RegionalProvider.as_str(), "regional-provider");
        assert_eq!(Source::Synthetic.as_str(), "synthetic");
    }

    #[test]
    fn test_source_serde_kebab_case() {
        let json = serde_json::to_string(&Source::RegionalProvider).unwrap();
        assert_eq!(json, "\"regional-provider\"");
    }

    #[test]
    fn test_concentrations_iter_declaration_order() {
        let mut c = Concentrations::default();
        c.set(Pollutant::No2, 10.0);
        c.set(Pollutant::Pm25, 5.0);

        let order: Vec<Pollutant> = c.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![Pollutant::Pm25, Pollutant::No2]);
    }

    #[test]
    fn test_concentrations_absent_excluded() {
        let c = Concentrations {
            pm10: Some(20.0),
            ..Default::default()
        };
        assert_eq!(c.iter().count(), 1);
        assert!(!c.is_empty());
        assert!(Concentrations::default().is_empty());
    }

    #[test]
    fn test_with_aqi_sets_matching_category() {
        let now = Utc::now();
        let reading = CanonicalReading::new(0.0, 0.0, Source::PrimaryProvider, now).with_aqi(150);
        assert_eq!(reading.aqi, Some(150));
        assert_eq!(reading.category, Some(Category::UnhealthySensitive));
    }

    #[test]
    fn test_pollutant_serde_names() {
        let json = serde_json::to_string(&Pollutant::Pm25).unwrap();
        assert_eq!(json, "\"PM2.5\"");
        let back: Pollutant = serde_json::from_str("\"O3\"").unwrap();
        assert_eq!(back, Pollutant::O3);
    }
}
