/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;

/// Default memory vector dimension (D)
pub const MEMORY_DIMENSION: usize = 128;

/// Default emotion state dimension (E), independent of D
pub const EMOTION_DIMENSION: usize = 32;

/// Default data qubit count (Q)
pub const QUBIT_COUNT: usize = 8;

/// Default shot count (S) per circuit execution
pub const SHOT_COUNT: u64 = 1024;

/// Rotation + entangling layers applied before the emotion phase stage
pub const VARIATIONAL_LAYERS: usize = 2;

/// Representative bitstrings emitted by the synthetic sampler
pub const SYNTHETIC_STATES: usize = 16;

/// Classical-fallback entanglement measure range [low, high)
pub const CLASSICAL_ENTANGLEMENT_RANGE: (f64, f64) = (0.3, 0.9);

/// Pearson correlation used when either magnitude series has zero variance
pub const UNDEFINED_CORRELATION: f64 = 0.5;

/// Geographic context confidence cap
pub const CONTEXT_CONFIDENCE_CAP: f64 = 0.9;

/// Indicator matches needed for full (uncapped) confidence
pub const CONTEXT_CONFIDENCE_NORMALIZER: f64 = 3.0;

/// Geocoding results at or below this confidence are rejected
pub const GEOCODE_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Regional fallback jitter half-width in degrees
pub const REGIONAL_JITTER_DEGREES: f64 = 0.05;

/// Global fallback jitter half-width in degrees (country unknown)
pub const GLOBAL_JITTER_DEGREES: f64 = 0.5;

/// Score the requested emotion starts from
pub const REQUESTED_EMOTION_SCORE: f64 = 0.75;

/// Neutral score blended in as regional confidence drops
pub const PROFILE_NEUTRAL_SCORE: f64 = 0.6;

/// Increment per trigger-keyword hit
pub const TRIGGER_BOOST: f64 = 0.05;

/// Upper bound on the total trigger boost for one emotion
pub const TRIGGER_BOOST_CAP: f64 = 0.15;

/// Emotional resonance clamp range
pub const RESONANCE_FLOOR: f64 = 0.3;
pub const RESONANCE_CEIL: f64 = 0.98;

/// Nominal coherence time reported by the status endpoint (microseconds)
pub const COHERENCE_TIME_US: f64 = 100.0;

/// Default worker pool size for per-request fan-out
pub const WORKER_POOL_SIZE: usize = 4;
