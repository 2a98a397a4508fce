//! Async orchestration over `qm-core`.
//!
//! Owns everything with I/O or shared state: configuration, the sampling
//! backend tiers, the remote sampler client, geocoding and narrative
//! collaborators, caches, and the bounded worker pool.

pub mod backend;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod narrative;
pub mod orchestrator;
pub mod remote;

pub use backend::{Backend, BackendState};
pub use config::{EngineConfig, GeocoderKind, NarratorKind};
pub use error::{EngineError, Result};
pub use geocoding::{Geocoder, NominatimGeocoder, NullGeocoder};
pub use narrative::{GeminiNarrator, NarrativeRequest, Narrator, TemplateNarrator};
pub use orchestrator::{ResultOrchestrator, StatusReport};
pub use remote::{HttpSampler, RemoteSampler};
