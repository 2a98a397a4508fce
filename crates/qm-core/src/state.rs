use serde::{Deserialize, Serialize};

use crate::circuit::BackendTier;
use crate::complex::ComplexVector;

/// How an encoder produced its vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", content = "tier", rename_all = "snake_case")]
pub enum EncodingPath {
    /// Derived from circuit measurement counts.
    Circuit(BackendTier),
    /// Hash-based classical fallback.
    Classical,
    /// Input carried no tokens; the vector is zero.
    Empty,
}

/// Fixed-dimension encoding of a memory fragment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryVector {
    pub components: ComplexVector,
    /// In [0, 1].
    pub entanglement_measure: f64,
    pub path: EncodingPath,
}

impl MemoryVector {
    pub fn dimension(&self) -> usize {
        self.components.len()
    }
}

/// Fixed-dimension encoding of an emotion label with its phase sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    pub amplitudes: ComplexVector,
    /// Parallel to `amplitudes`.
    pub phases: Vec<f64>,
    /// In [0, 1].
    pub coherence_measure: f64,
    pub path: EncodingPath,
}

impl EmotionState {
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }
}
