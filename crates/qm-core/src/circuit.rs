//! Circuit construction and offline sampling.
//!
//! A circuit is built from two seeds: the memory seed fixes the initial bit
//! pattern, a fixed engine-owned parameter vector drives the rotation and
//! entangling layers, and the emotion seed sets the phase stage. Sampling
//! goes through a [`Sampler`]; the offline cascade here is local statevector
//! simulation, then the synthetic distribution. The remote tier lives in the
//! engine crate, ahead of this cascade.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_1_SQRT_2, TAU};
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::constants::{QUBIT_COUNT, SHOT_COUNT, SYNTHETIC_STATES, VARIATIONAL_LAYERS};
use crate::hashing::{StableHasher, unit_interval};

/// Largest register the statevector simulator accepts (2^16 amplitudes).
pub const MAX_SIMULATED_QUBITS: usize = 16;

/// Which tier of the sampling cascade produced a set of counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendTier {
    RemoteHardware,
    LocalSimulation,
    SyntheticDistribution,
}

impl BackendTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteHardware => "remote_hardware",
            Self::LocalSimulation => "local_simulation",
            Self::SyntheticDistribution => "synthetic_distribution",
        }
    }
}

impl fmt::Display for BackendTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum SamplerError {
    TooManyQubits { requested: usize, max: usize },
    Unavailable(String),
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerError::TooManyQubits { requested, max } => {
                write!(f, "circuit needs {requested} qubits, simulator supports {max}")
            }
            SamplerError::Unavailable(msg) => write!(f, "sampler unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SamplerError {}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "lowercase")]
pub enum Gate {
    X { qubit: usize },
    H { qubit: usize },
    Ry { qubit: usize, theta: f64 },
    Rz { qubit: usize, theta: f64 },
    Cx { control: usize, target: usize },
}

/// Spacing of the static rotation angles, 2π / φ² radians.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653_3;

/// Static rotation angles, one per (layer, qubit). Not trained.
#[derive(Clone, Debug, PartialEq)]
pub struct CircuitParams {
    pub layers: usize,
    pub qubits: usize,
    angles: Vec<f64>,
}

impl CircuitParams {
    /// Golden-angle spaced angles: θ(l, q) = (l·Q + q + 1)·GOLDEN_ANGLE mod 2π.
    pub fn fixed(qubits: usize, layers: usize) -> Self {
        let angles = (0..layers * qubits)
            .map(|k| ((k + 1) as f64 * GOLDEN_ANGLE).rem_euclid(TAU))
            .collect();
        Self {
            layers,
            qubits,
            angles,
        }
    }

    pub fn angle(&self, layer: usize, qubit: usize) -> f64 {
        self.angles[layer * self.qubits + qubit]
    }
}

impl Default for CircuitParams {
    fn default() -> Self {
        Self::fixed(QUBIT_COUNT, VARIATIONAL_LAYERS)
    }
}

/// Gate list over `data_qubits` plus optional parity-check ancillas.
///
/// Bitstrings are written with character k holding qubit k, data qubits
/// first, parity ancillas after them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub data_qubits: usize,
    pub parity_qubits: usize,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn build(memory_seed: u64, emotion_seed: u64, params: &CircuitParams, parity_check: bool) -> Self {
        let q = params.qubits;
        let mut gates = Vec::new();

        // initial bit pattern from the memory seed
        for i in 0..q {
            if (memory_seed >> (i % 64)) & 1 == 1 {
                gates.push(Gate::X { qubit: i });
            }
        }

        for layer in 0..params.layers {
            for i in 0..q {
                gates.push(Gate::Ry {
                    qubit: i,
                    theta: params.angle(layer, i),
                });
            }
            for i in 0..q.saturating_sub(1) {
                gates.push(Gate::Cx {
                    control: i,
                    target: i + 1,
                });
            }
        }

        // entangling pairs carrying the emotion phase
        let emotion_phase = unit_interval(emotion_seed) * TAU;
        for i in (0..q.saturating_sub(1)).step_by(2) {
            gates.push(Gate::Cx {
                control: i,
                target: i + 1,
            });
        }
        for i in 0..q {
            gates.push(Gate::Rz {
                qubit: i,
                theta: emotion_phase / (i + 1) as f64,
            });
        }
        // interfere the phases back into the measurement basis
        for i in 0..q {
            if (emotion_seed >> ((i + 32) % 64)) & 1 == 1 {
                gates.push(Gate::H { qubit: i });
            }
        }

        let parity_qubits = if parity_check { q / 2 } else { 0 };
        for p in 0..parity_qubits {
            let ancilla = q + p;
            gates.push(Gate::Cx {
                control: 2 * p,
                target: ancilla,
            });
            gates.push(Gate::Cx {
                control: 2 * p + 1,
                target: ancilla,
            });
        }

        Self {
            data_qubits: q,
            parity_qubits,
            gates,
        }
    }

    pub fn total_qubits(&self) -> usize {
        self.data_qubits + self.parity_qubits
    }
}

/// Measurement histogram: bitstring → shot count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    pub fn new(map: BTreeMap<String, u64>) -> Self {
        Self(map)
    }

    pub fn shots(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    /// Fraction of shots in which `bit` reads '1'.
    pub fn bit_probability(&self, bit: usize) -> f64 {
        let total = self.shots();
        if total == 0 {
            return 0.0;
        }
        let set: u64 = self
            .0
            .iter()
            .filter(|(bits, _)| bits.as_bytes().get(bit) == Some(&b'1'))
            .map(|(_, c)| *c)
            .sum();
        set as f64 / total as f64
    }

    /// Shannon entropy of the distribution divided by its maximum (`qubits` bits).
    pub fn normalized_entropy(&self, qubits: usize) -> f64 {
        let total = self.shots();
        if total == 0 || qubits == 0 {
            return 0.0;
        }
        let entropy: f64 = self
            .0
            .values()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total as f64;
                -p * p.log2()
            })
            .sum();
        (entropy / qubits as f64).clamp(0.0, 1.0)
    }

    /// 1 − population variance of the outcome probabilities.
    pub fn uniformity(&self) -> f64 {
        let total = self.shots();
        if total == 0 {
            return 0.0;
        }
        if self.0.len() < 2 {
            return 1.0;
        }
        let probs: Vec<f64> = self.0.values().map(|&c| c as f64 / total as f64).collect();
        let mean = probs.iter().sum::<f64>() / probs.len() as f64;
        let var = probs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / probs.len() as f64;
        (1.0 - var).clamp(0.0, 1.0)
    }

    /// Drop shots whose parity ancillas disagree with their data pair, strip
    /// the ancilla bits, and rescale back to the original shot total.
    /// If every shot fails the check the unfiltered data bits are kept.
    pub fn apply_parity_check(&self, data_qubits: usize, parity_qubits: usize) -> Counts {
        if parity_qubits == 0 {
            return self.clone();
        }
        let total = self.shots();
        let mut kept: BTreeMap<String, u64> = BTreeMap::new();
        let mut stripped: BTreeMap<String, u64> = BTreeMap::new();

        for (bits, &count) in &self.0 {
            let bytes = bits.as_bytes();
            let data = String::from_utf8_lossy(&bytes[..data_qubits.min(bytes.len())]).into_owned();
            *stripped.entry(data.clone()).or_default() += count;

            let consistent = (0..parity_qubits).all(|p| {
                let a = bytes.get(2 * p) == Some(&b'1');
                let b = bytes.get(2 * p + 1) == Some(&b'1');
                let parity = bytes.get(data_qubits + p) == Some(&b'1');
                (a ^ b) == parity
            });
            if consistent {
                *kept.entry(data).or_default() += count;
            }
        }

        let source = if kept.is_empty() { stripped } else { kept };
        rescale(source, total)
    }
}

/// Largest-remainder rescale so the counts sum to exactly `shots`.
fn rescale(map: BTreeMap<String, u64>, shots: u64) -> Counts {
    let current: u64 = map.values().sum();
    if current == shots || current == 0 {
        return Counts(map);
    }
    let mut floors: Vec<(String, u64, f64)> = map
        .into_iter()
        .map(|(k, c)| {
            let exact = c as f64 * shots as f64 / current as f64;
            (k, exact.floor() as u64, exact - exact.floor())
        })
        .collect();
    let assigned: u64 = floors.iter().map(|(_, f, _)| *f).sum();
    let mut order: Vec<usize> = (0..floors.len()).collect();
    order.sort_by(|&a, &b| floors[b].2.total_cmp(&floors[a].2));
    for &i in order.iter().cycle().take(shots.saturating_sub(assigned) as usize) {
        floors[i].1 += 1;
    }
    Counts(
        floors
            .into_iter()
            .filter(|(_, c, _)| *c > 0)
            .map(|(k, c, _)| (k, c))
            .collect(),
    )
}

pub trait Sampler {
    fn tier(&self) -> BackendTier;
    fn sample(&self, circuit: &Circuit, seed: u64, shots: u64) -> Result<Counts, SamplerError>;
}

/// Exact statevector evolution followed by seeded multinomial sampling.
#[derive(Clone, Copy, Debug)]
pub struct StatevectorSimulator {
    pub max_qubits: usize,
}

impl Default for StatevectorSimulator {
    fn default() -> Self {
        Self {
            max_qubits: MAX_SIMULATED_QUBITS,
        }
    }
}

impl StatevectorSimulator {
    /// Final amplitudes of `circuit` starting from |0…0⟩.
    pub fn statevector(&self, circuit: &Circuit) -> Result<Vec<Complex>, SamplerError> {
        let n = circuit.total_qubits();
        if n > self.max_qubits {
            return Err(SamplerError::TooManyQubits {
                requested: n,
                max: self.max_qubits,
            });
        }
        let mut state = vec![Complex::ZERO; 1 << n];
        state[0] = Complex::ONE;
        for gate in &circuit.gates {
            apply_gate(&mut state, *gate);
        }
        Ok(state)
    }
}

fn apply_gate(state: &mut [Complex], gate: Gate) {
    match gate {
        Gate::X { qubit } => for_pairs(state, qubit, |a, b| (b, a)),
        Gate::H { qubit } => for_pairs(state, qubit, |a, b| {
            ((a + b).scale(FRAC_1_SQRT_2), (a - b).scale(FRAC_1_SQRT_2))
        }),
        Gate::Ry { qubit, theta } => {
            let (s, c) = (theta / 2.0).sin_cos();
            for_pairs(state, qubit, |a, b| (a.scale(c) - b.scale(s), a.scale(s) + b.scale(c)))
        }
        Gate::Rz { qubit, theta } => {
            let lo = Complex::from_polar(1.0, -theta / 2.0);
            let hi = Complex::from_polar(1.0, theta / 2.0);
            for_pairs(state, qubit, |a, b| (a * lo, b * hi))
        }
        Gate::Cx { control, target } => {
            let (cm, tm) = (1usize << control, 1usize << target);
            for i in 0..state.len() {
                if i & cm != 0 && i & tm == 0 {
                    state.swap(i, i | tm);
                }
            }
        }
    }
}

/// Apply a 2×2 update to every amplitude pair differing only in `qubit`.
fn for_pairs(state: &mut [Complex], qubit: usize, f: impl Fn(Complex, Complex) -> (Complex, Complex)) {
    let mask = 1usize << qubit;
    for i in 0..state.len() {
        if i & mask == 0 {
            let (a, b) = f(state[i], state[i | mask]);
            state[i] = a;
            state[i | mask] = b;
        }
    }
}

fn bitstring(index: usize, width: usize) -> String {
    (0..width)
        .map(|k| if (index >> k) & 1 == 1 { '1' } else { '0' })
        .collect()
}

impl Sampler for StatevectorSimulator {
    fn tier(&self) -> BackendTier {
        BackendTier::LocalSimulation
    }

    fn sample(&self, circuit: &Circuit, seed: u64, shots: u64) -> Result<Counts, SamplerError> {
        let state = self.statevector(circuit)?;
        let mut cumulative = Vec::with_capacity(state.len());
        let mut acc = 0.0;
        for amp in &state {
            acc += amp.norm_sqr();
            cumulative.push(acc);
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut indices: BTreeMap<usize, u64> = BTreeMap::new();
        for _ in 0..shots.max(1) {
            let r = rng.random::<f64>() * acc;
            let idx = cumulative.partition_point(|&c| c <= r).min(state.len() - 1);
            *indices.entry(idx).or_default() += 1;
        }

        let width = circuit.total_qubits();
        Ok(Counts(
            indices
                .into_iter()
                .map(|(i, c)| (bitstring(i, width), c))
                .collect(),
        ))
    }
}

/// Last-resort tier: a bounded set of representative bitstrings with
/// exponentially distributed weights. Always returns a non-empty histogram.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticSampler {
    pub states: usize,
}

impl Default for SyntheticSampler {
    fn default() -> Self {
        Self {
            states: SYNTHETIC_STATES,
        }
    }
}

impl Sampler for SyntheticSampler {
    fn tier(&self) -> BackendTier {
        BackendTier::SyntheticDistribution
    }

    fn sample(&self, circuit: &Circuit, seed: u64, shots: u64) -> Result<Counts, SamplerError> {
        let shots = shots.max(1);
        let width = circuit.total_qubits().max(1);
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        for k in 0..self.states.max(1) {
            let pattern = StableHasher::new().u64(seed).u64(k as u64).finish();
            let bits: String = (0..width)
                .map(|b| if (pattern >> (b % 64)) & 1 == 1 { '1' } else { '0' })
                .collect();
            // exponential draw: -ln(U), U in (0, 1]
            let u = 1.0 - rng.random::<f64>();
            *weights.entry(bits).or_default() += -u.ln();
        }

        let total: f64 = weights.values().sum();
        let raw: BTreeMap<String, u64> = weights
            .into_iter()
            .map(|(bits, w)| {
                let scaled = if total > 0.0 { w / total * 1e6 } else { 1.0 };
                (bits, scaled.round().max(1.0) as u64)
            })
            .collect();
        Ok(rescale(raw, shots))
    }
}

/// Offline half of the sampling cascade: local simulation, then synthetic.
#[derive(Clone, Debug)]
pub struct CircuitSimulator {
    pub params: CircuitParams,
    pub shots: u64,
    pub parity_check: bool,
    pub local_enabled: bool,
    pub local: StatevectorSimulator,
    pub synthetic: SyntheticSampler,
}

impl Default for CircuitSimulator {
    fn default() -> Self {
        Self {
            params: CircuitParams::default(),
            shots: SHOT_COUNT,
            parity_check: false,
            local_enabled: true,
            local: StatevectorSimulator::default(),
            synthetic: SyntheticSampler::default(),
        }
    }
}

/// Counts plus the tier that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub counts: Counts,
    pub tier: BackendTier,
}

impl CircuitSimulator {
    pub fn qubits(&self) -> usize {
        self.params.qubits
    }

    pub fn circuit(&self, memory_seed: u64, emotion_seed: u64) -> Circuit {
        Circuit::build(memory_seed, emotion_seed, &self.params, self.parity_check)
    }

    /// Sampling seed for a pair of circuit seeds.
    pub fn sampling_seed(memory_seed: u64, emotion_seed: u64) -> u64 {
        StableHasher::new().u64(memory_seed).u64(emotion_seed).finish()
    }

    /// Strip parity ancillas from raw counts of `circuit`.
    pub fn finish(&self, circuit: &Circuit, raw: Counts, tier: BackendTier) -> Measurement {
        Measurement {
            counts: raw.apply_parity_check(circuit.data_qubits, circuit.parity_qubits),
            tier,
        }
    }

    /// Run `circuit` through local simulation, falling back to the synthetic
    /// distribution. Never fails.
    pub fn sample_offline(&self, circuit: &Circuit, seed: u64) -> Measurement {
        if self.local_enabled
            && let Ok(raw) = self.local.sample(circuit, seed, self.shots)
        {
            return self.finish(circuit, raw, BackendTier::LocalSimulation);
        }
        self.synthetic_only(circuit, seed)
    }

    pub fn synthetic_only(&self, circuit: &Circuit, seed: u64) -> Measurement {
        let raw = match self.synthetic.sample(circuit, seed, self.shots) {
            Ok(raw) => raw,
            // unreachable in practice: the synthetic sampler is total
            Err(_) => Counts(BTreeMap::from([(bitstring(0, circuit.total_qubits()), self.shots)])),
        };
        self.finish(circuit, raw, BackendTier::SyntheticDistribution)
    }

    /// simulate(seed_memory_hash, seed_emotion_hash) over the offline tiers.
    pub fn simulate(&self, memory_seed: u64, emotion_seed: u64) -> Measurement {
        let circuit = self.circuit(memory_seed, emotion_seed);
        self.sample_offline(&circuit, Self::sampling_seed(memory_seed, emotion_seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::hash_str;

    fn single(gates: Vec<Gate>, qubits: usize) -> Circuit {
        Circuit {
            data_qubits: qubits,
            parity_qubits: 0,
            gates,
        }
    }

    #[test]
    fn test_fixed_params_golden_spacing() {
        let params = CircuitParams::fixed(8, 2);
        assert!((params.angle(0, 0) - GOLDEN_ANGLE).abs() < 1e-12);
        assert!((params.angle(1, 0) - (9.0 * GOLDEN_ANGLE).rem_euclid(TAU)).abs() < 1e-12);
        for layer in 0..2 {
            for qubit in 0..8 {
                assert!((0.0..TAU).contains(&params.angle(layer, qubit)));
            }
        }
    }

    #[test]
    fn test_x_flips_qubit() {
        let sim = StatevectorSimulator::default();
        let counts = sim
            .sample(&single(vec![Gate::X { qubit: 1 }], 3), 7, 100)
            .unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.iter().next().unwrap().0, "010");
        assert_eq!(counts.shots(), 100);
    }

    #[test]
    fn test_hadamard_splits_evenly() {
        let sim = StatevectorSimulator::default();
        let state = sim.statevector(&single(vec![Gate::H { qubit: 0 }], 1)).unwrap();
        assert!((state[0].norm_sqr() - 0.5).abs() < 1e-12);
        assert!((state[1].norm_sqr() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bell_pair_correlated() {
        let sim = StatevectorSimulator::default();
        let circuit = single(
            vec![Gate::H { qubit: 0 }, Gate::Cx { control: 0, target: 1 }],
            2,
        );
        let counts = sim.sample(&circuit, 42, 2000).unwrap();
        for (bits, _) in counts.iter() {
            assert!(bits == "00" || bits == "11", "uncorrelated outcome {bits}");
        }
    }

    #[test]
    fn test_rz_preserves_probabilities() {
        let sim = StatevectorSimulator::default();
        let state = sim
            .statevector(&single(
                vec![Gate::H { qubit: 0 }, Gate::Rz { qubit: 0, theta: 1.3 }],
                1,
            ))
            .unwrap();
        assert!((state[0].norm_sqr() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_build_statevector_normalized() {
        let circuit = Circuit::build(hash_str("寺"), hash_str("nostalgic"), &CircuitParams::default(), true);
        let state = StatevectorSimulator::default().statevector(&circuit).unwrap();
        let total: f64 = state.iter().map(|a| a.norm_sqr()).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(circuit.total_qubits(), QUBIT_COUNT + QUBIT_COUNT / 2);
    }

    #[test]
    fn test_too_many_qubits_rejected() {
        let sim = StatevectorSimulator { max_qubits: 4 };
        let circuit = Circuit::build(1, 2, &CircuitParams::fixed(6, 1), false);
        assert!(matches!(
            sim.sample(&circuit, 0, 10),
            Err(SamplerError::TooManyQubits { requested: 6, max: 4 })
        ));
    }

    #[test]
    fn test_offline_falls_back_to_synthetic() {
        let sim = CircuitSimulator {
            local: StatevectorSimulator { max_qubits: 2 },
            ..CircuitSimulator::default()
        };
        let m = sim.simulate(11, 22);
        assert_eq!(m.tier, BackendTier::SyntheticDistribution);
        assert_eq!(m.counts.shots(), SHOT_COUNT);
        assert!(!m.counts.is_empty());
    }

    #[test]
    fn test_local_disabled_uses_synthetic() {
        let sim = CircuitSimulator {
            local_enabled: false,
            ..CircuitSimulator::default()
        };
        assert_eq!(sim.simulate(1, 2).tier, BackendTier::SyntheticDistribution);
    }

    #[test]
    fn test_simulation_deterministic() {
        let sim = CircuitSimulator::default();
        let a = sim.simulate(hash_str("memory"), hash_str("warm"));
        let b = sim.simulate(hash_str("memory"), hash_str("warm"));
        assert_eq!(a, b);
        assert_eq!(a.tier, BackendTier::LocalSimulation);
        assert_eq!(a.counts.shots(), SHOT_COUNT);
    }

    #[test]
    fn test_synthetic_bounded_states() {
        let circuit = Circuit::build(5, 6, &CircuitParams::default(), false);
        let counts = SyntheticSampler::default().sample(&circuit, 99, 1024).unwrap();
        assert!(counts.len() <= SYNTHETIC_STATES);
        assert_eq!(counts.shots(), 1024);
        for (bits, _) in counts.iter() {
            assert_eq!(bits.len(), QUBIT_COUNT);
        }
    }

    #[test]
    fn test_parity_check_strips_ancillas() {
        let sim = CircuitSimulator {
            parity_check: true,
            ..CircuitSimulator::default()
        };
        let m = sim.simulate(hash_str("a"), hash_str("b"));
        assert_eq!(m.counts.shots(), SHOT_COUNT);
        for (bits, _) in m.counts.iter() {
            assert_eq!(bits.len(), QUBIT_COUNT);
        }
    }

    #[test]
    fn test_parity_check_discards_inconsistent_shots() {
        // pair (0,1) = "10" has parity 1; the "100" outcome carries ancilla 0
        let raw = Counts::new(BTreeMap::from([
            ("101".to_string(), 30),
            ("100".to_string(), 10),
        ]));
        let fixed = raw.apply_parity_check(2, 1);
        assert_eq!(fixed.shots(), 40);
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed.iter().next().unwrap(), (&"10".to_string(), &40));
    }

    #[test]
    fn test_bit_probability_and_entropy() {
        let counts = Counts::new(BTreeMap::from([
            ("10".to_string(), 50),
            ("01".to_string(), 50),
        ]));
        assert!((counts.bit_probability(0) - 0.5).abs() < 1e-12);
        assert!((counts.normalized_entropy(2) - 0.5).abs() < 1e-12);
        assert!((counts.uniformity() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gate_serializes_tagged() {
        let json = serde_json::to_string(&Gate::Cx { control: 0, target: 1 }).unwrap();
        assert_eq!(json, r#"{"gate":"cx","control":0,"target":1}"#);
    }
}
