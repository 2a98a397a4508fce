//! Quantum-metaphor memory recall engine.
//!
//! Encodes a free-text memory fragment and an emotion label into complex
//! vectors (optionally through a simulated circuit), correlates them, and
//! weights synthesized location candidates by the result.
//!
//! Zero I/O: the remote sampler, geocoder and narrator live in `qm-engine`.

pub mod cache;
pub mod circuit;
pub mod complex;
pub mod constants;
pub mod context;
pub mod emotion;
pub mod encoder;
pub mod entanglement;
pub mod geo;
pub mod grammar;
pub mod hashing;
pub mod pool;
pub mod resonance;
pub mod result;
pub mod state;
pub mod synthesizer;
pub mod time;
pub mod tokenizer;
pub mod visualization;
pub mod vocabulary;

pub use cache::{CacheStats, LruTtlCache};
pub use circuit::{
    BackendTier, Circuit, CircuitParams, CircuitSimulator, Counts, Gate, Measurement, Sampler,
    SamplerError, StatevectorSimulator, SyntheticSampler,
};
pub use complex::{Complex, ComplexVector};
pub use constants::{EMOTION_DIMENSION, MEMORY_DIMENSION, QUBIT_COUNT, SHOT_COUNT};
pub use encoder::{EmotionEncoder, StateEncoder};
pub use entanglement::{EntanglementAnalysis, analyze};
pub use geo::{
    CoordinateSource, Coordinates, Country, CulturalContext, GeocodeRequest, GeocodeResult,
    GeographicContext, UrbanRural,
};
pub use grammar::{ContextKind, NameSource};
pub use pool::BufferPool;
pub use result::{
    Assembly, PrimaryLocation, QuantumResult, QuantumStateSummary, SecondaryLocation, SlotWeights,
    cache_key,
};
pub use state::{EmotionState, EncodingPath, MemoryVector};
pub use synthesizer::{LocationCandidate, RankedLocation, Role, SynthesisPlan, synthesize};
pub use visualization::{MapPoint, VisualizationKind, VisualizationRequest};
pub use vocabulary::extract_keywords;
