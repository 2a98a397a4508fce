//! Location candidate synthesis.
//!
//! Synthesis is split around the geocoding call, which is the only step
//! that needs I/O: [`plan`] does keyword extraction, classification and
//! naming; [`SynthesisPlan::complete`] resolves coordinates from an
//! optional geocoding result and scores resonance.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::context::classify;
use crate::emotion::normalize_label;
use crate::geo::{
    CoordinateSource, Coordinates, GeocodeRequest, GeocodeResult, GeographicContext,
    resolve_coordinates,
};
use crate::grammar::{NameSource, synthesize_name};
use crate::resonance::{self, Resonance};
use crate::vocabulary::extract_keywords;

/// Candidate slot within one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Primary,
    Secondary(usize),
}

impl Role {
    /// 0 for the primary, n for the n-th secondary.
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary(n) => *n,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub coordinates: Coordinates,
    pub keywords: BTreeSet<String>,
    pub emotional_resonance: Resonance,
    pub geographic_context: GeographicContext,
    pub name_source: NameSource,
    pub coordinate_source: CoordinateSource,
}

/// A candidate paired with its probability weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub role: Role,
    pub probability: f64,
    pub candidate: LocationCandidate,
}

/// Everything up to (not including) coordinate resolution.
#[derive(Clone, Debug)]
pub struct SynthesisPlan {
    pub role: Role,
    pub probability: f64,
    pub emotion: String,
    pub keywords: BTreeSet<String>,
    pub context: GeographicContext,
    pub name: String,
    pub name_source: NameSource,
}

pub fn plan(memory_text: &str, emotion: &str, probability: f64, role: Role) -> SynthesisPlan {
    let emotion = normalize_label(emotion);
    let keywords = extract_keywords(memory_text);
    let context = classify(&keywords);
    let (name, name_source) = synthesize_name(&context, &keywords, &emotion, role.ordinal());
    SynthesisPlan {
        role,
        probability,
        emotion,
        keywords,
        context,
        name,
        name_source,
    }
}

impl SynthesisPlan {
    /// Request for the geocoding collaborator.
    pub fn geocode_request(&self) -> GeocodeRequest {
        GeocodeRequest {
            location_name: self.name.clone(),
            country_hint: self.context.country.is_known().then_some(self.context.country),
            context: self.context.clone(),
        }
    }

    pub fn complete(self, geocoded: Option<&GeocodeResult>) -> RankedLocation {
        let (coordinates, coordinate_source) =
            resolve_coordinates(&self.name, self.context.country, geocoded);
        let emotional_resonance = resonance::score(&self.emotion, &self.context, &self.keywords);
        RankedLocation {
            role: self.role,
            probability: self.probability,
            candidate: LocationCandidate {
                name: self.name,
                coordinates,
                keywords: self.keywords,
                emotional_resonance,
                geographic_context: self.context,
                name_source: self.name_source,
                coordinate_source,
            },
        }
    }
}

/// One-shot synthesis with a synchronous geocoder.
pub fn synthesize(
    memory_text: &str,
    emotion: &str,
    probability: f64,
    role: Role,
    geocode: impl FnOnce(&GeocodeRequest) -> Option<GeocodeResult>,
) -> RankedLocation {
    let plan = plan(memory_text, emotion, probability, role);
    let geocoded = geocode(&plan.geocode_request());
    plan.complete(geocoded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REGIONAL_JITTER_DEGREES;
    use crate::geo::Country;

    #[test]
    fn test_japanese_memory_primary() {
        let r = synthesize("古い石段を登る寺の記憶", "nostalgic", 0.8, Role::Primary, |_| None);
        assert_eq!(r.candidate.geographic_context.country, Country::Japan);
        assert!(r.candidate.geographic_context.confidence > 0.0);
        assert!(matches!(r.candidate.name_source, NameSource::Grammar { .. }));
        assert!(matches!(
            r.candidate.coordinate_source,
            CoordinateSource::RegionalFallback { country: Country::Japan }
        ));
    }

    #[test]
    fn test_emotion_label_case_does_not_change_names() {
        for role in [Role::Primary, Role::Secondary(1), Role::Secondary(2)] {
            let upper = plan("古い石段を登る寺の記憶", " Nostalgic", 0.8, role);
            let lower = plan("古い石段を登る寺の記憶", "nostalgic", 0.8, role);
            assert_eq!(upper.name, lower.name);
            assert_eq!(upper.emotion, "nostalgic");
        }
    }

    #[test]
    fn test_empty_memory_generic() {
        let r = synthesize("", "nostalgic", 0.75, Role::Primary, |_| None);
        assert_eq!(r.candidate.geographic_context.country, Country::Unknown);
        assert_eq!(r.candidate.name_source, NameSource::GenericPool);
        assert_eq!(r.candidate.coordinate_source, CoordinateSource::GlobalFallback);
    }

    #[test]
    fn test_geocoder_receives_hint() {
        let mut seen = None;
        synthesize("rain over the thames", "melancholy", 0.5, Role::Secondary(1), |req| {
            seen = Some(req.clone());
            None
        });
        let req = seen.unwrap();
        assert_eq!(req.country_hint, Some(Country::Uk));
        assert!(!req.location_name.is_empty());
    }

    #[test]
    fn test_low_confidence_geocode_falls_back() {
        let r = synthesize("gelato in a florence piazza", "warm", 0.5, Role::Primary, |req| {
            Some(GeocodeResult {
                lat: 0.0,
                lng: 0.0,
                formatted_address: req.location_name.clone(),
                country: "italy".into(),
                confidence: 0.1,
                source: "stub".into(),
            })
        });
        let base = Country::Italy.reference_point().unwrap();
        let c = r.candidate.coordinates;
        assert!((c.lat - base.lat).abs() <= REGIONAL_JITTER_DEGREES + 1e-12);
        assert!((c.lng - base.lng).abs() <= REGIONAL_JITTER_DEGREES + 1e-12);
    }

    #[test]
    fn test_accepted_geocode_used() {
        let r = synthesize("京都の寺", "peaceful", 0.9, Role::Primary, |_| {
            Some(GeocodeResult {
                lat: 35.0,
                lng: 135.7,
                formatted_address: "Kyoto".into(),
                country: "japan".into(),
                confidence: 0.8,
                source: "stub".into(),
            })
        });
        assert_eq!(r.candidate.coordinates, Coordinates::new(35.0, 135.7));
    }

    #[test]
    fn test_slots_differ_in_name_or_template() {
        let text = "古い石段を登る寺の記憶";
        let names: Vec<String> = [Role::Primary, Role::Secondary(1), Role::Secondary(2)]
            .into_iter()
            .map(|role| plan(text, "nostalgic", 0.5, role).name)
            .collect();
        assert!(names[0] != names[1] || names[1] != names[2]);
    }
}
