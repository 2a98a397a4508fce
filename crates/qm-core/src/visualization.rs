//! Weighted map points handed to the visualization renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::resonance::emotion_key;
use crate::result::QuantumResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationKind {
    #[default]
    Probability,
    Coherence,
    Entanglement,
    #[serde(rename = "quantum_3d")]
    Quantum3d,
}

impl VisualizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probability => "probability",
            Self::Coherence => "coherence",
            Self::Entanglement => "entanglement",
            Self::Quantum3d => "quantum_3d",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualizationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "probability" => Ok(Self::Probability),
            "coherence" => Ok(Self::Coherence),
            "entanglement" => Ok(Self::Entanglement),
            "quantum_3d" | "quantum3d" | "3d" => Ok(Self::Quantum3d),
            other => Err(format!(
                "unknown visualization kind '{other}' (expected probability, coherence, entanglement or quantum_3d)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub probability: f64,
    pub coherence: f64,
    pub entanglement: f64,
    pub confidence: f64,
    pub semantic_similarity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRequest {
    pub points: Vec<MapPoint>,
    pub center: Coordinates,
    pub kind: VisualizationKind,
}

impl QuantumResult {
    /// Points for every candidate, centred on the primary location.
    ///
    /// `semantic_similarity` is the candidate's resonance with the requested
    /// emotion.
    pub fn visualization(&self, kind: VisualizationKind) -> VisualizationRequest {
        let key = emotion_key(&self.emotion);
        let points = self
            .locations()
            .map(|loc| {
                let c = &loc.candidate;
                MapPoint {
                    name: c.name.clone(),
                    lat: c.coordinates.lat,
                    lng: c.coordinates.lng,
                    probability: loc.probability,
                    coherence: self.quantum_state.coherence,
                    entanglement: self.quantum_state.entanglement,
                    confidence: c.geographic_context.confidence,
                    semantic_similarity: c
                        .emotional_resonance
                        .get(&key)
                        .copied()
                        .unwrap_or_default(),
                }
            })
            .collect();
        VisualizationRequest {
            points,
            center: self.primary_location.location.candidate.coordinates,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("Quantum_3D".parse::<VisualizationKind>(), Ok(VisualizationKind::Quantum3d));
        assert_eq!("coherence".parse::<VisualizationKind>(), Ok(VisualizationKind::Coherence));
        assert!("heatmap".parse::<VisualizationKind>().is_err());
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&VisualizationKind::Quantum3d).unwrap();
        assert_eq!(json, "\"quantum_3d\"");
        for kind in [
            VisualizationKind::Probability,
            VisualizationKind::Coherence,
            VisualizationKind::Entanglement,
            VisualizationKind::Quantum3d,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
