use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{GEOCODE_CONFIDENCE_THRESHOLD, GLOBAL_JITTER_DEGREES, REGIONAL_JITTER_DEGREES};
use crate::hashing::hash_str;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Supported countries, in tie-break order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Japan,
    France,
    Italy,
    Uk,
    Usa,
    #[default]
    Unknown,
}

impl Country {
    pub const SUPPORTED: [Country; 5] = [
        Country::Japan,
        Country::France,
        Country::Italy,
        Country::Uk,
        Country::Usa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Japan => "japan",
            Self::France => "france",
            Self::Italy => "italy",
            Self::Uk => "uk",
            Self::Usa => "usa",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "japan" => Self::Japan,
            "france" => Self::France,
            "italy" => Self::Italy,
            "uk" => Self::Uk,
            "usa" => Self::Usa,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }

    /// Fixed reference point used when geocoding fails.
    pub fn reference_point(&self) -> Option<Coordinates> {
        match self {
            Self::Japan => Some(Coordinates::new(35.0116, 135.7681)),
            Self::France => Some(Coordinates::new(48.8566, 2.3522)),
            Self::Italy => Some(Coordinates::new(41.9028, 12.4964)),
            Self::Uk => Some(Coordinates::new(51.5074, -0.1278)),
            Self::Usa => Some(Coordinates::new(40.7128, -74.0060)),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference point when the country is unknown (Tokyo).
pub const GLOBAL_REFERENCE: Coordinates = Coordinates::new(35.6762, 139.6503);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrbanRural {
    Urban,
    Rural,
    #[default]
    Unknown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CulturalContext {
    Traditional,
    Modern,
    #[default]
    Unknown,
}

/// Classified geography of a memory fragment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeographicContext {
    pub region: String,
    pub country: Country,
    pub urban_rural: UrbanRural,
    pub cultural_context: CulturalContext,
    /// In [0, 1]; 0 when the country is unknown.
    pub confidence: f64,
}

impl Default for GeographicContext {
    fn default() -> Self {
        Self::unknown()
    }
}

impl GeographicContext {
    pub fn unknown() -> Self {
        Self {
            region: "unknown".to_string(),
            country: Country::Unknown,
            urban_rural: UrbanRural::Unknown,
            cultural_context: CulturalContext::Unknown,
            confidence: 0.0,
        }
    }
}

/// Input to the geocoding collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub location_name: String,
    pub country_hint: Option<Country>,
    pub context: GeographicContext,
}

/// Output of the geocoding collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub country: String,
    pub confidence: f64,
    pub source: String,
}

/// Where a candidate's coordinates came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoordinateSource {
    Geocoded { source: String, confidence: f64 },
    RegionalFallback { country: Country },
    GlobalFallback,
}

/// Deterministic offset in [-half_width, +half_width] for each axis,
/// derived from hash(name) mod 100.
fn jitter(name: &str, half_width: f64) -> (f64, f64) {
    let h = hash_str(name);
    let lat = ((h % 100) as f64 / 99.0) * 2.0 - 1.0;
    let lng = (((h / 100) % 100) as f64 / 99.0) * 2.0 - 1.0;
    (lat * half_width, lng * half_width)
}

/// Regional reference point jittered by the name, or the global default
/// with a wider jitter when the country is unknown.
pub fn fallback_coordinates(name: &str, country: Country) -> (Coordinates, CoordinateSource) {
    match country.reference_point() {
        Some(base) => {
            let (dlat, dlng) = jitter(name, REGIONAL_JITTER_DEGREES);
            (
                Coordinates::new(base.lat + dlat, base.lng + dlng),
                CoordinateSource::RegionalFallback { country },
            )
        }
        None => {
            let (dlat, dlng) = jitter(name, GLOBAL_JITTER_DEGREES);
            (
                Coordinates::new(GLOBAL_REFERENCE.lat + dlat, GLOBAL_REFERENCE.lng + dlng),
                CoordinateSource::GlobalFallback,
            )
        }
    }
}

/// Accept a geocoding result only above the confidence threshold.
pub fn resolve_coordinates(
    name: &str,
    country: Country,
    geocoded: Option<&GeocodeResult>,
) -> (Coordinates, CoordinateSource) {
    match geocoded {
        Some(r) if r.confidence > GEOCODE_CONFIDENCE_THRESHOLD && r.lat.is_finite() && r.lng.is_finite() => (
            Coordinates::new(r.lat, r.lng),
            CoordinateSource::Geocoded {
                source: r.source.clone(),
                confidence: r.confidence,
            },
        ),
        _ => fallback_coordinates(name, country),
    }
}
