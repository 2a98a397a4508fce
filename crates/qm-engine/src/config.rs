//! Engine configuration: TOML file, then environment overrides.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use qm_core::constants::{VARIATIONAL_LAYERS, WORKER_POOL_SIZE};
use qm_core::{
    CircuitParams, CircuitSimulator, EMOTION_DIMENSION, EmotionEncoder, MEMORY_DIMENSION,
    QUBIT_COUNT, SHOT_COUNT, StateEncoder,
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub encoder: EncoderConfig,
    pub circuit: CircuitConfig,
    pub remote: RemoteConfig,
    pub geocoding: GeocodingConfig,
    pub narrative: NarrativeConfig,
    pub cache: CacheConfig,
    pub workers: WorkerConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub memory_dimension: usize,
    pub emotion_dimension: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            memory_dimension: MEMORY_DIMENSION,
            emotion_dimension: EMOTION_DIMENSION,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Encode through circuit measurements instead of the classical path.
    pub enabled: bool,
    pub qubits: usize,
    pub shots: u64,
    pub layers: usize,
    pub parity_check: bool,
    /// Whether the local statevector simulator may be used.
    pub local_simulation: bool,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            qubits: QUBIT_COUNT,
            shots: SHOT_COUNT,
            layers: VARIATIONAL_LAYERS,
            parity_check: false,
            local_simulation: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderKind {
    #[default]
    None,
    Nominatim,
}

impl FromStr for GeocoderKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "" => Ok(Self::None),
            "nominatim" => Ok(Self::Nominatim),
            other => Err(EngineError::Config(format!("unknown geocoder '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocoderKind,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Minimum delay between two outgoing requests.
    pub min_interval_ms: u64,
    /// Query strategies tried per location before giving up.
    pub max_queries: usize,
    pub cache_entries: usize,
    pub cache_ttl_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderKind::None,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "qm/0.1 (quantum memory recall)".to_string(),
            timeout_secs: 10,
            min_interval_ms: 1000,
            max_queries: 3,
            cache_entries: 512,
            cache_ttl_secs: 3600,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarratorKind {
    #[default]
    Template,
    Gemini,
}

impl FromStr for NarratorKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "template" | "" => Ok(Self::Template),
            "gemini" => Ok(Self::Gemini),
            other => Err(EngineError::Config(format!("unknown narrator '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub provider: NarratorKind,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            provider: NarratorKind::Template,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash-latest".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub result_entries: usize,
    pub result_ttl_secs: u64,
    pub encoder_entries: usize,
    pub encoder_ttl_secs: u64,
    /// Reusable vector buffers kept on the free-list.
    pub buffer_pool: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            result_entries: 256,
            result_ttl_secs: 3600,
            encoder_entries: 512,
            encoder_ttl_secs: 3600,
            buffer_pool: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub pool_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: WORKER_POOL_SIZE,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(EngineError::Config(format!("{key}: expected a boolean, got '{other}'"))),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Defaults, overlaid with `path` when given, then with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .map_err(|e| EngineError::Config(format!("{}: {e}", p.display())))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QM_*` and `GEMINI_API_KEY` overrides read through `lookup`.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("QM_USE_CIRCUIT") {
            self.circuit.enabled = parse_bool("QM_USE_CIRCUIT", &v)?;
        }
        if let Some(v) = lookup("QM_REMOTE_URL") {
            self.remote.url = non_empty(v);
        }
        if let Some(v) = lookup("QM_REMOTE_TOKEN") {
            self.remote.token = non_empty(v);
        }
        if let Some(v) = lookup("QM_GEOCODER") {
            self.geocoding.provider = v.parse()?;
        }
        if let Some(v) = lookup("QM_NARRATOR") {
            self.narrative.provider = v.parse()?;
        }
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.narrative.gemini_api_key = non_empty(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.encoder.memory_dimension == 0 || self.encoder.emotion_dimension == 0 {
            return Err(EngineError::Config("encoder dimensions must be positive".into()));
        }
        if !(1..=32).contains(&self.circuit.qubits) {
            return Err(EngineError::Config(format!(
                "circuit.qubits must be in 1..=32, got {}",
                self.circuit.qubits
            )));
        }
        if self.circuit.shots == 0 {
            return Err(EngineError::Config("circuit.shots must be positive".into()));
        }
        if self.workers.pool_size == 0 {
            return Err(EngineError::Config("workers.pool_size must be positive".into()));
        }
        if self.narrative.provider == NarratorKind::Gemini && self.narrative.gemini_api_key.is_none() {
            return Err(EngineError::Config(
                "gemini narrator selected but GEMINI_API_KEY is not set".into(),
            ));
        }
        Ok(())
    }

    pub fn simulator(&self) -> CircuitSimulator {
        CircuitSimulator {
            params: CircuitParams::fixed(self.circuit.qubits, self.circuit.layers),
            shots: self.circuit.shots,
            parity_check: self.circuit.parity_check,
            local_enabled: self.circuit.local_simulation,
            ..CircuitSimulator::default()
        }
    }

    pub fn state_encoder(&self) -> StateEncoder {
        StateEncoder::new(self.encoder.memory_dimension, self.circuit.qubits)
    }

    pub fn emotion_encoder(&self) -> EmotionEncoder {
        EmotionEncoder::new(self.encoder.emotion_dimension, self.circuit.qubits)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.encoder.memory_dimension, 128);
        assert_eq!(c.encoder.emotion_dimension, 32);
        assert_eq!(c.circuit.qubits, 8);
        assert_eq!(c.circuit.shots, 1024);
        assert!(!c.circuit.enabled);
        assert_eq!(c.geocoding.provider, GeocoderKind::None);
        assert_eq!(c.narrative.provider, NarratorKind::Template);
        assert_eq!(c.cache.result_entries, 256);
        assert_eq!(c.workers.pool_size, 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let c = EngineConfig::from_toml_str(
            r#"
            [circuit]
            enabled = true
            qubits = 6

            [cache]
            result_entries = 8
            "#,
        )
        .unwrap();
        assert!(c.circuit.enabled);
        assert_eq!(c.circuit.qubits, 6);
        assert_eq!(c.circuit.shots, 1024);
        assert_eq!(c.cache.result_entries, 8);
        assert_eq!(c.encoder.memory_dimension, 128);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("[circuit]\nqubits = \"many\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut c = EngineConfig::default();
        c.apply_env_with(env(&[
            ("QM_USE_CIRCUIT", "true"),
            ("QM_REMOTE_URL", "http://localhost:9000"),
            ("QM_GEOCODER", "nominatim"),
            ("QM_NARRATOR", "gemini"),
            ("GEMINI_API_KEY", "k"),
        ]))
        .unwrap();
        assert!(c.circuit.enabled);
        assert_eq!(c.remote.url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(c.geocoding.provider, GeocoderKind::Nominatim);
        assert_eq!(c.narrative.provider, NarratorKind::Gemini);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_empty_env_clears() {
        let mut c = EngineConfig::default();
        c.remote.url = Some("http://x".into());
        c.apply_env_with(env(&[("QM_REMOTE_URL", " ")])).unwrap();
        assert_eq!(c.remote.url, None);
    }

    #[test]
    fn test_invalid_env_values() {
        let mut c = EngineConfig::default();
        assert!(c.apply_env_with(env(&[("QM_USE_CIRCUIT", "maybe")])).is_err());
        assert!(c.apply_env_with(env(&[("QM_GEOCODER", "google")])).is_err());
    }

    #[test]
    fn test_gemini_requires_key() {
        let mut c = EngineConfig::default();
        c.narrative.provider = NarratorKind::Gemini;
        assert!(matches!(c.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qm.toml");
        std::fs::write(&path, "[workers]\npool_size = 2\n").unwrap();
        let c = EngineConfig::from_toml_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(c.workers.pool_size, 2);
        assert!(EngineConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
