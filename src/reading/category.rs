//! AQI category and dominant-pollutant classification.
//!
//! Both functions are pure: fixed tables, no hidden state.

use super::{Concentrations, Pollutant};
use serde::{Deserialize, Serialize};

/// Health category bands, ordered by severity.
///
/// Boundaries are inclusive on the lower band: exactly 50 is `Good`,
/// exactly 51 is `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthySensitive,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a 0–500 AQI value onto its health category.
pub fn category_for(aqi: u16) -> Category {
    match aqi {
        0..=50 => Category::Good,
        51..=100 => Category::Moderate,
        101..=150 => Category::UnhealthySensitive,
        151..=200 => Category::Unhealthy,
        201..=300 => Category::VeryUnhealthy,
        _ => Category::Hazardous,
    }
}

/// Pollutant with the highest severity ratio (`value / reference`).
///
/// Absent pollutants are excluded, not treated as zero. Ties go to the
/// earlier pollutant in declaration order (PM2.5 > PM10 > O₃ > NO₂).
/// Returns `None` for an empty map; callers must guard. The provider
/// normalizers never call this on an empty map.
pub fn dominant_pollutant(concentrations: &Concentrations) -> Option<Pollutant> {
    let mut best: Option<(Pollutant, f64)> = None;
    for (pollutant, value) in concentrations.iter() {
        let ratio = value / pollutant.reference();
        let better = match best {
            None => true,
            Some((_, best_ratio)) => ratio > best_ratio,
        };
        if better {
            best = Some((pollutant, ratio));
        }
    }
    best.map(|(pollutant, _)| pollutant)
}
