//! Per-request pipeline.
//!
//! `LOOKUP_CACHE → (hit: return) | (miss: ENCODE → ANALYZE → SYNTHESIZE →
//! ASSEMBLE → STORE_CACHE → return)`. Encoders and synthesis calls share a
//! bounded worker pool. Every failure except narration is recovered here and
//! logged.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use qm_core::constants::{COHERENCE_TIME_US, GEOCODE_CONFIDENCE_THRESHOLD};
use qm_core::emotion::normalize_label;
use qm_core::hashing::StableHasher;
use qm_core::synthesizer::plan;
use qm_core::tokenizer::tokenize;
use qm_core::{
    Assembly, BufferPool, CacheStats, EmotionEncoder, EmotionState, EncodingPath, LruTtlCache,
    MemoryVector, NameSource, QuantumResult, RankedLocation, SlotWeights, StateEncoder,
    SynthesisPlan, VisualizationKind, VisualizationRequest, analyze, cache_key,
};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::backend::{Backend, BackendState};
use crate::config::{EngineConfig, GeocoderKind, NarratorKind};
use crate::error::{EngineError, Result};
use crate::geocoding::{Geocoder, NominatimGeocoder, NullGeocoder};
use crate::narrative::{GeminiNarrator, NarrativeRequest, Narrator, TemplateNarrator};
use crate::remote::{HttpSampler, RemoteSampler};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Backend and cache snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct StatusReport {
    pub backend: String,
    pub backend_state: BackendState,
    pub qubits: usize,
    pub memory_dimension: usize,
    pub emotion_dimension: usize,
    pub circuit_enabled: bool,
    pub coherence_time_us: f64,
    pub entanglement_pairs: usize,
    pub active_qubits: usize,
    pub last_measurement: Option<String>,
    pub geocoder: String,
    pub narrator: String,
    pub result_cache: CacheStats,
    pub memory_cache: CacheStats,
    pub emotion_cache: CacheStats,
}

pub struct ResultOrchestrator {
    config: EngineConfig,
    backend: Backend,
    geocoder: Arc<dyn Geocoder>,
    narrator: Arc<dyn Narrator>,
    workers: Semaphore,
    state_encoder: StateEncoder,
    emotion_encoder: EmotionEncoder,
    pool: Arc<BufferPool>,
    results: Mutex<LruTtlCache<u64, QuantumResult>>,
    memories: Mutex<LruTtlCache<u64, MemoryVector>>,
    emotions: Mutex<LruTtlCache<u64, EmotionState>>,
}

impl ResultOrchestrator {
    /// Build the collaborators named by `config`.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let remote: Option<Arc<dyn RemoteSampler>> = config.remote.url.as_deref().map(|url| {
            Arc::new(HttpSampler::new(url, config.remote.token.clone(), config.remote_timeout()))
                as Arc<dyn RemoteSampler>
        });
        let geocoder: Arc<dyn Geocoder> = match config.geocoding.provider {
            GeocoderKind::None => Arc::new(NullGeocoder),
            GeocoderKind::Nominatim => Arc::new(NominatimGeocoder::new(&config.geocoding)),
        };
        let narrator: Arc<dyn Narrator> = match config.narrative.provider {
            NarratorKind::Template => Arc::new(TemplateNarrator),
            NarratorKind::Gemini => {
                let key = config.narrative.gemini_api_key.clone().ok_or_else(|| {
                    EngineError::Config("gemini narrator requires an API key".into())
                })?;
                Arc::new(GeminiNarrator::new(&config.narrative, key))
            }
        };
        Ok(Self::with_collaborators(config, remote, geocoder, narrator))
    }

    pub fn with_collaborators(
        config: EngineConfig,
        remote: Option<Arc<dyn RemoteSampler>>,
        geocoder: Arc<dyn Geocoder>,
        narrator: Arc<dyn Narrator>,
    ) -> Self {
        let cache = &config.cache;
        let result_ttl = Duration::from_secs(cache.result_ttl_secs);
        let encoder_ttl = Duration::from_secs(cache.encoder_ttl_secs);
        tracing::debug!(
            geocoder = geocoder.name(),
            narrator = narrator.name(),
            remote = remote.as_ref().map(|r| r.name().to_string()).unwrap_or_default(),
            "orchestrator ready"
        );
        Self {
            backend: Backend::new(config.simulator(), remote, config.remote_timeout()),
            geocoder,
            narrator,
            workers: Semaphore::new(config.workers.pool_size.max(1)),
            state_encoder: config.state_encoder(),
            emotion_encoder: config.emotion_encoder(),
            pool: Arc::new(BufferPool::new(cache.buffer_pool)),
            results: Mutex::new(LruTtlCache::new(cache.result_entries, result_ttl)),
            memories: Mutex::new(LruTtlCache::new(cache.encoder_entries, encoder_ttl)),
            emotions: Mutex::new(LruTtlCache::new(cache.encoder_entries, encoder_ttl)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Analyze one memory fragment under one emotion.
    ///
    /// Backend and geocoding failures degrade to fallback tiers and
    /// coordinates. Narration failures surface as [`EngineError::Narrative`]
    /// and a closed worker pool as [`EngineError::Worker`].
    pub async fn analyze(&self, memory_text: &str, emotion: &str) -> Result<QuantumResult> {
        let started = Instant::now();
        let key = cache_key(memory_text, emotion);
        let cached = lock(&self.results).get(&key);
        if let Some(hit) = cached {
            tracing::debug!(emotion, "result cache hit");
            return Ok(hit.as_cached());
        }

        let label = normalize_label(emotion);
        let (memory, emotion_state) =
            tokio::join!(self.encode_memory(memory_text), self.encode_emotion(&label));
        let (memory, emotion_state) = (memory?, emotion_state?);
        let analysis = analyze(&memory, &emotion_state);
        let weights = SlotWeights::derive(&analysis, &memory);

        let [primary, second, third] = weights
            .slots()
            .map(|(role, probability)| plan(memory_text, &label, probability, role));
        let (primary, second, third) =
            tokio::join!(self.locate(primary), self.locate(second), self.locate(third));
        let (primary, second, third) = (primary?, second?, third?);

        let story = self
            .narrator
            .narrate(&NarrativeRequest {
                location: primary.candidate.name.clone(),
                memory: memory_text.to_string(),
                emotion: label.clone(),
            })
            .await
            .map_err(|e| match e {
                EngineError::Narrative(_) => e,
                other => EngineError::Narrative(other.to_string()),
            })?;

        let result = QuantumResult::assemble(Assembly {
            emotion: &label,
            memory: &memory,
            emotion_state: &emotion_state,
            analysis,
            primary,
            story,
            secondaries: vec![second, third],
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
        self.pool.recycle(memory.components.into_inner());
        self.pool.recycle(emotion_state.amplitudes.into_inner());

        lock(&self.results).insert(key, result.clone());
        tracing::info!(
            emotion = %result.emotion,
            primary = %result.primary_location.location.candidate.name,
            ms = result.analysis_time_ms,
            "analysis complete"
        );
        Ok(result)
    }

    /// Analyze and emit the visualization point list for `kind`.
    pub async fn map_points(
        &self,
        memory_text: &str,
        emotion: &str,
        kind: VisualizationKind,
    ) -> Result<VisualizationRequest> {
        Ok(self.analyze(memory_text, emotion).await?.visualization(kind))
    }

    pub async fn status(&self) -> StatusReport {
        let tier = self.backend.ready_tier().await;
        let qubits = self.config.circuit.qubits;
        StatusReport {
            backend: tier.as_str().to_string(),
            backend_state: self.backend.state(),
            qubits,
            memory_dimension: self.config.encoder.memory_dimension,
            emotion_dimension: self.config.encoder.emotion_dimension,
            circuit_enabled: self.config.circuit.enabled,
            coherence_time_us: COHERENCE_TIME_US,
            entanglement_pairs: qubits / 2,
            active_qubits: qubits,
            last_measurement: self.backend.last_measurement(),
            geocoder: self.geocoder.name().to_string(),
            narrator: self.narrator.name().to_string(),
            result_cache: lock(&self.results).stats(),
            memory_cache: lock(&self.memories).stats(),
            emotion_cache: lock(&self.emotions).stats(),
        }
    }

    async fn encode_memory(&self, text: &str) -> Result<MemoryVector> {
        let key = StableHasher::new().str(text).finish();
        let cached = lock(&self.memories).get(&key);
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let _permit = self.workers.acquire().await?;
        let measurement = if self.config.circuit.enabled && !tokenize(text).is_empty() {
            let (m, e) = StateEncoder::circuit_seeds(text);
            self.measure(m, e).await
        } else {
            None
        };

        let encoder = self.state_encoder;
        let pool = Arc::clone(&self.pool);
        let owned = text.to_string();
        let encoded =
            tokio::task::spawn_blocking(move || encoder.encode(&owned, measurement.as_ref(), &pool))
                .await;
        let vector = match encoded {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("memory encoder task failed, encoding inline: {e}");
                self.state_encoder.encode(text, None, &self.pool)
            }
        };
        if vector.path == EncodingPath::Empty {
            tracing::debug!("memory text has no tokens, using the zero vector");
        }
        lock(&self.memories).insert(key, vector.clone());
        Ok(vector)
    }

    async fn encode_emotion(&self, emotion: &str) -> Result<EmotionState> {
        let label = normalize_label(emotion);
        let key = StableHasher::new().str(&label).finish();
        let cached = lock(&self.emotions).get(&key);
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let _permit = self.workers.acquire().await?;
        let measurement = if self.config.circuit.enabled {
            let (m, e) = EmotionEncoder::circuit_seeds(&label);
            self.measure(m, e).await
        } else {
            None
        };

        let encoder = self.emotion_encoder;
        let pool = Arc::clone(&self.pool);
        let owned = label.clone();
        let encoded =
            tokio::task::spawn_blocking(move || encoder.encode(&owned, measurement.as_ref(), &pool))
                .await;
        let state = match encoded {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("emotion encoder task failed, encoding inline: {e}");
                self.emotion_encoder.encode(&label, None, &self.pool)
            }
        };
        lock(&self.emotions).insert(key, state.clone());
        Ok(state)
    }

    /// Circuit measurement, or None to take the classical path.
    async fn measure(&self, memory_seed: u64, emotion_seed: u64) -> Option<qm_core::Measurement> {
        match self.backend.measure(memory_seed, emotion_seed).await {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!("circuit measurement failed, using classical encoding: {e}");
                None
            }
        }
    }

    async fn locate(&self, plan: SynthesisPlan) -> Result<RankedLocation> {
        if plan.name_source == NameSource::GenericPool {
            tracing::debug!(role = ?plan.role, name = %plan.name, "no grammar matched, using generic name");
        }
        let request = plan.geocode_request();
        let geocoded = {
            let _permit = self.workers.acquire().await?;
            match self.geocoder.geocode(&request).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(location = %request.location_name, "geocoding failed: {e}");
                    None
                }
            }
        };
        if let Some(r) = &geocoded
            && r.confidence <= GEOCODE_CONFIDENCE_THRESHOLD
        {
            tracing::warn!(
                location = %request.location_name,
                confidence = r.confidence,
                "geocode below confidence threshold, using fallback coordinates"
            );
        }
        Ok(plan.complete(geocoded.as_ref()))
    }
}
