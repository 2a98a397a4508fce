//! Text and emotion encoders.
//!
//! Each encoder has a circuit path (amplitudes from measurement counts) and a
//! classical path (amplitudes from hashes). Which one runs is decided by the
//! caller: passing a [`Measurement`] selects the circuit path.

use crate::circuit::Measurement;
use crate::complex::{Complex, ComplexVector};
use crate::constants::{CLASSICAL_ENTANGLEMENT_RANGE, EMOTION_DIMENSION, MEMORY_DIMENSION, QUBIT_COUNT};
use crate::emotion::{basis_or_neutral, normalize_label};
use crate::hashing::{StableHasher, hash_indexed, hash_str, unit_interval};
use crate::pool::BufferPool;
use crate::state::{EmotionState, EncodingPath, MemoryVector};
use crate::tokenizer::tokenize;

/// Emotion seed paired with memory text when the memory circuit is built.
const MEMORY_CIRCUIT_EMOTION: &str = "neutral";
/// Memory seed paired with an emotion label when the emotion circuit is built.
const EMOTION_CIRCUIT_MEMORY: &str = "emotion";

/// Largest value below 2π in millionths.
const PHASE_MODULUS: u64 = 6_283_185;

/// hash mod 2π, at micro-radian resolution.
fn hash_phase(hash: u64) -> f64 {
    (hash % PHASE_MODULUS) as f64 / 1_000_000.0
}

#[derive(Clone, Copy, Debug)]
pub struct StateEncoder {
    pub dimension: usize,
    pub qubits: usize,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self {
            dimension: MEMORY_DIMENSION,
            qubits: QUBIT_COUNT,
        }
    }
}

impl StateEncoder {
    pub fn new(dimension: usize, qubits: usize) -> Self {
        Self { dimension, qubits }
    }

    /// (memory_seed, emotion_seed) for the circuit backing `text`.
    pub fn circuit_seeds(text: &str) -> (u64, u64) {
        (hash_str(text), hash_str(MEMORY_CIRCUIT_EMOTION))
    }

    /// Encode `text`. Empty or token-less text yields the zero vector with
    /// entanglement 0 regardless of the path requested.
    pub fn encode(&self, text: &str, measurement: Option<&Measurement>, pool: &BufferPool) -> MemoryVector {
        let words = tokenize(text);
        if words.is_empty() {
            return MemoryVector {
                components: ComplexVector::from_components(pool.take(self.dimension)),
                entanglement_measure: 0.0,
                path: EncodingPath::Empty,
            };
        }
        match measurement {
            Some(m) => self.encode_circuit(text, m, pool),
            None => self.encode_classical(text, &words, pool),
        }
    }

    fn encode_circuit(&self, text: &str, measurement: &Measurement, pool: &BufferPool) -> MemoryVector {
        let counts = &measurement.counts;
        let bit_probs: Vec<f64> = (0..self.qubits).map(|b| counts.bit_probability(b)).collect();

        let mut buf = pool.take(self.dimension);
        for (i, c) in buf.iter_mut().enumerate() {
            let amplitude = bit_probs[i % self.qubits.max(1)].sqrt();
            let phase = hash_phase(hash_indexed(text, i));
            *c = Complex::from_polar(amplitude, phase);
        }

        let mut components = ComplexVector::from_components(buf);
        components.normalize();
        MemoryVector {
            components,
            entanglement_measure: counts.normalized_entropy(self.qubits),
            path: EncodingPath::Circuit(measurement.tier),
        }
    }

    fn encode_classical(&self, text: &str, words: &[String], pool: &BufferPool) -> MemoryVector {
        let mut buf = pool.take(self.dimension);
        for (i, c) in buf.iter_mut().enumerate() {
            let influence: f64 = words
                .iter()
                .map(|w| (hash_indexed(w, i) % 100) as f64 / 100.0)
                .sum::<f64>()
                / words.len() as f64;
            let phase = hash_phase(hash_indexed(text, i));
            *c = Complex::from_polar(influence.sqrt(), phase);
        }

        let mut components = ComplexVector::from_components(buf);
        components.normalize();
        MemoryVector {
            components,
            entanglement_measure: classical_entanglement(text),
            path: EncodingPath::Classical,
        }
    }
}

/// Deterministic stand-in for a random draw from the classical range, so
/// cached and freshly computed vectors agree.
pub fn classical_entanglement(text: &str) -> f64 {
    let (low, high) = CLASSICAL_ENTANGLEMENT_RANGE;
    let u = unit_interval(StableHasher::new().str(text).str("entanglement").finish());
    low + (high - low) * u
}

#[derive(Clone, Copy, Debug)]
pub struct EmotionEncoder {
    pub dimension: usize,
    pub qubits: usize,
}

impl Default for EmotionEncoder {
    fn default() -> Self {
        Self {
            dimension: EMOTION_DIMENSION,
            qubits: QUBIT_COUNT,
        }
    }
}

impl EmotionEncoder {
    pub fn new(dimension: usize, qubits: usize) -> Self {
        Self { dimension, qubits }
    }

    /// (memory_seed, emotion_seed) for the circuit backing `emotion`.
    pub fn circuit_seeds(emotion: &str) -> (u64, u64) {
        (hash_str(EMOTION_CIRCUIT_MEMORY), hash_str(&normalize_label(emotion)))
    }

    pub fn encode(&self, emotion: &str, measurement: Option<&Measurement>, pool: &BufferPool) -> EmotionState {
        let label = normalize_label(emotion);
        match measurement {
            Some(m) => self.encode_circuit(&label, m, pool),
            None => self.encode_classical(&label, pool),
        }
    }

    fn encode_circuit(&self, label: &str, measurement: &Measurement, pool: &BufferPool) -> EmotionState {
        let counts = &measurement.counts;
        let bit_probs: Vec<f64> = (0..self.qubits).map(|b| counts.bit_probability(b)).collect();

        let mut buf = pool.take(self.dimension);
        let mut phases = Vec::with_capacity(self.dimension);
        for (i, c) in buf.iter_mut().enumerate() {
            let phase = hash_phase(hash_indexed(label, i));
            *c = Complex::from_polar(bit_probs[i % self.qubits.max(1)], phase);
            phases.push(phase);
        }

        let mut amplitudes = ComplexVector::from_components(buf);
        amplitudes.normalize();
        EmotionState {
            amplitudes,
            phases,
            coherence_measure: counts.uniformity(),
            path: EncodingPath::Circuit(measurement.tier),
        }
    }

    /// Periodic extension of the per-emotion basis with amplitude decay and
    /// phase drift. Unknown labels use the neutral basis.
    fn encode_classical(&self, label: &str, pool: &BufferPool) -> EmotionState {
        let basis = basis_or_neutral(label);

        let mut buf = pool.take(self.dimension);
        let mut phases = Vec::with_capacity(self.dimension);
        for (i, c) in buf.iter_mut().enumerate() {
            let (base_amp, base_phase) = basis[i % basis.len()];
            let x = i as f64;
            let amplitude = base_amp * (-0.01 * x).exp() * (1.0 + 0.1 * (0.1 * x).sin());
            let phase = (base_phase + 0.05 * x).rem_euclid(std::f64::consts::TAU);
            *c = Complex::from_polar(amplitude, phase);
            phases.push(phase);
        }

        let mut amplitudes = ComplexVector::from_components(buf);
        let coherence_measure = mean_to_rms(&amplitudes);
        amplitudes.normalize();
        EmotionState {
            amplitudes,
            phases,
            coherence_measure,
            path: EncodingPath::Classical,
        }
    }
}

/// mean(|a|) / rms(|a|), in [0, 1] by Cauchy-Schwarz.
fn mean_to_rms(v: &ComplexVector) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let n = v.len() as f64;
    let mean = v.magnitudes().sum::<f64>() / n;
    let rms = (v.norm_sqr() / n).sqrt();
    if rms <= 0.0 {
        return 0.0;
    }
    (mean / rms).clamp(0.0, 1.0)
}
