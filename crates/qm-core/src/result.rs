//! Score-to-probability mapping and result assembly.

use serde::{Deserialize, Serialize};

use crate::emotion::normalize_label;
use crate::entanglement::EntanglementAnalysis;
use crate::hashing::StableHasher;
use crate::state::{EmotionState, EncodingPath, MemoryVector};
use crate::synthesizer::{LocationCandidate, RankedLocation, Role};

/// Probability weights for the three candidate slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotWeights {
    pub primary: f64,
    pub secondary: [f64; 2],
}

impl SlotWeights {
    pub fn derive(analysis: &EntanglementAnalysis, memory: &MemoryVector) -> Self {
        Self {
            primary: 0.75 + 0.2 * analysis.entanglement_strength,
            secondary: [
                0.35 + 0.3 * analysis.correlation,
                0.25 + 0.2 * memory.entanglement_measure,
            ],
        }
    }

    /// (role, probability) in slot order.
    pub fn slots(&self) -> [(Role, f64); 3] {
        [
            (Role::Primary, self.primary),
            (Role::Secondary(1), self.secondary[0]),
            (Role::Secondary(2), self.secondary[1]),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantumStateSummary {
    pub coherence: f64,
    pub entanglement: f64,
    pub superposition: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryLocation {
    #[serde(flatten)]
    pub location: RankedLocation,
    pub story: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecondaryLocation {
    #[serde(flatten)]
    pub location: RankedLocation,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantumResult {
    pub emotion: String,
    pub primary_location: PrimaryLocation,
    /// Non-increasing probability.
    pub secondary_locations: Vec<SecondaryLocation>,
    pub quantum_state: QuantumStateSummary,
    pub correlation: f64,
    pub memory_path: EncodingPath,
    pub emotion_path: EncodingPath,
    pub analysis_time_ms: u64,
}

/// Content hash of a request, used as the result cache key.
pub fn cache_key(memory_text: &str, emotion: &str) -> u64 {
    StableHasher::new()
        .str(memory_text)
        .str(&normalize_label(emotion))
        .finish()
}

/// Short description of a secondary candidate from its first three keywords.
pub fn secondary_description(candidate: &LocationCandidate) -> String {
    let leading: Vec<&str> = candidate.keywords.iter().take(3).map(String::as_str).collect();
    if leading.is_empty() {
        return candidate.name.clone();
    }
    format!("{}の香りと共に...", leading.join("、"))
}

pub struct Assembly<'a> {
    pub emotion: &'a str,
    pub memory: &'a MemoryVector,
    pub emotion_state: &'a EmotionState,
    pub analysis: EntanglementAnalysis,
    pub primary: RankedLocation,
    pub story: String,
    pub secondaries: Vec<RankedLocation>,
    pub elapsed_ms: u64,
}

impl QuantumResult {
    pub fn assemble(a: Assembly<'_>) -> Self {
        let mut secondaries = a.secondaries;
        // stable: equal probabilities keep slot order
        secondaries.sort_by(|x, y| y.probability.total_cmp(&x.probability));

        Self {
            emotion: normalize_label(a.emotion),
            primary_location: PrimaryLocation {
                location: a.primary,
                story: a.story,
            },
            secondary_locations: secondaries
                .into_iter()
                .map(|location| SecondaryLocation {
                    description: secondary_description(&location.candidate),
                    location,
                })
                .collect(),
            quantum_state: QuantumStateSummary {
                coherence: a.emotion_state.coherence_measure,
                entanglement: a.analysis.entanglement_strength,
                superposition: a.memory.entanglement_measure,
            },
            correlation: a.analysis.correlation,
            memory_path: a.memory.path,
            emotion_path: a.emotion_state.path,
            analysis_time_ms: a.elapsed_ms,
        }
    }

    /// Copy served from the cache: identical apart from zero timing.
    pub fn as_cached(&self) -> Self {
        Self {
            analysis_time_ms: 0,
            ..self.clone()
        }
    }

    /// All candidates, primary first.
    pub fn locations(&self) -> impl Iterator<Item = &RankedLocation> {
        std::iter::once(&self.primary_location.location)
            .chain(self.secondary_locations.iter().map(|s| &s.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ComplexVector;
    use crate::synthesizer::synthesize;

    fn memory(measure: f64) -> MemoryVector {
        MemoryVector {
            components: ComplexVector::zeros(4),
            entanglement_measure: measure,
            path: EncodingPath::Classical,
        }
    }

    fn emotion_state() -> EmotionState {
        EmotionState {
            amplitudes: ComplexVector::zeros(4),
            phases: vec![0.0; 4],
            coherence_measure: 0.9,
            path: EncodingPath::Classical,
        }
    }

    #[test]
    fn test_weights_formulas() {
        let analysis = EntanglementAnalysis {
            entanglement_strength: 0.5,
            correlation: -0.2,
        };
        let w = SlotWeights::derive(&analysis, &memory(0.6));
        assert!((w.primary - 0.85).abs() < 1e-12);
        assert!((w.secondary[0] - 0.29).abs() < 1e-12);
        assert!((w.secondary[1] - 0.37).abs() < 1e-12);
    }

    #[test]
    fn test_secondaries_sorted_descending() {
        let text = "rain over the thames";
        let m = memory(0.8);
        let e = emotion_state();
        let result = QuantumResult::assemble(Assembly {
            emotion: "melancholy",
            memory: &m,
            emotion_state: &e,
            analysis: EntanglementAnalysis {
                entanglement_strength: 0.1,
                correlation: -0.9,
            },
            primary: synthesize(text, "melancholy", 0.77, Role::Primary, |_| None),
            story: "story".into(),
            secondaries: vec![
                synthesize(text, "melancholy", 0.08, Role::Secondary(1), |_| None),
                synthesize(text, "melancholy", 0.41, Role::Secondary(2), |_| None),
            ],
            elapsed_ms: 12,
        });
        let probs: Vec<f64> = result.secondary_locations.iter().map(|s| s.location.probability).collect();
        assert_eq!(probs, vec![0.41, 0.08]);
        assert_eq!(result.quantum_state.coherence, 0.9);
        assert_eq!(result.quantum_state.superposition, 0.8);
        assert_eq!(result.as_cached().analysis_time_ms, 0);
        assert_eq!(result.locations().count(), 3);
    }

    #[test]
    fn test_cache_key_normalizes_emotion() {
        assert_eq!(cache_key("寺", "Nostalgic"), cache_key("寺", " nostalgic"));
        assert_ne!(cache_key("寺", "nostalgic"), cache_key("寺", "warm"));
    }

    #[test]
    fn test_description_from_keywords() {
        let r = synthesize("古い石段を登る寺の記憶", "nostalgic", 0.3, Role::Secondary(1), |_| None);
        let d = secondary_description(&r.candidate);
        assert!(d.ends_with("の香りと共に..."));
        let r = synthesize("", "nostalgic", 0.3, Role::Secondary(1), |_| None);
        assert_eq!(secondary_description(&r.candidate), r.candidate.name);
    }
}
