//! Sampling backend selection.
//!
//! `Uninitialized → Probing → Ready(tier)`. Probing checks the remote
//! backend's health once; afterwards every measurement starts at the ready
//! tier and cascades downward on failure (remote → local → synthetic).
//! Tests pin a tier with [`Backend::force_tier`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use qm_core::time::{millis_to_iso8601, now_unix_millis};
use qm_core::{BackendTier, CircuitSimulator, Measurement};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{EngineError, Result};
use crate::remote::RemoteSampler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "tier", rename_all = "snake_case")]
pub enum BackendState {
    Uninitialized,
    Probing,
    Ready(BackendTier),
}

pub struct Backend {
    simulator: Arc<CircuitSimulator>,
    remote: Option<Arc<dyn RemoteSampler>>,
    remote_timeout: Duration,
    state: Mutex<BackendState>,
    /// Serializes probing so concurrent first requests probe once.
    probe_lock: AsyncMutex<()>,
    last_measurement_ms: Mutex<Option<u64>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Backend {
    pub fn new(
        simulator: CircuitSimulator,
        remote: Option<Arc<dyn RemoteSampler>>,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            simulator: Arc::new(simulator),
            remote,
            remote_timeout,
            state: Mutex::new(BackendState::Uninitialized),
            probe_lock: AsyncMutex::new(()),
            last_measurement_ms: Mutex::new(None),
        }
    }

    pub fn state(&self) -> BackendState {
        *lock(&self.state)
    }

    pub fn simulator(&self) -> &CircuitSimulator {
        &self.simulator
    }

    /// Skip probing and start every measurement at `tier`.
    pub fn force_tier(&self, tier: BackendTier) {
        *lock(&self.state) = BackendState::Ready(tier);
    }

    /// ISO-8601 time of the last completed measurement.
    pub fn last_measurement(&self) -> Option<String> {
        lock(&self.last_measurement_ms).map(millis_to_iso8601)
    }

    fn offline_tier(&self) -> BackendTier {
        if self.simulator.local_enabled {
            BackendTier::LocalSimulation
        } else {
            BackendTier::SyntheticDistribution
        }
    }

    /// Resolve the ready tier, probing on first use.
    pub async fn ready_tier(&self) -> BackendTier {
        if let BackendState::Ready(tier) = self.state() {
            return tier;
        }
        let _guard = self.probe_lock.lock().await;
        if let BackendState::Ready(tier) = self.state() {
            return tier;
        }
        *lock(&self.state) = BackendState::Probing;

        let tier = match &self.remote {
            Some(remote) => match tokio::time::timeout(self.remote_timeout, remote.health()).await {
                Ok(Ok(())) => {
                    tracing::info!(backend = remote.name(), "remote backend ready");
                    BackendTier::RemoteHardware
                }
                Ok(Err(e)) => {
                    tracing::warn!(backend = remote.name(), "remote backend unavailable: {e}");
                    self.offline_tier()
                }
                Err(_) => {
                    tracing::warn!(backend = remote.name(), "remote health check timed out");
                    self.offline_tier()
                }
            },
            None => self.offline_tier(),
        };
        tracing::debug!(tier = %tier, "backend ready");
        *lock(&self.state) = BackendState::Ready(tier);
        tier
    }

    /// Measure the circuit for a seed pair. Never fails: remote errors and
    /// timeouts fall through to the offline tiers.
    pub async fn measure(&self, memory_seed: u64, emotion_seed: u64) -> Result<Measurement> {
        let tier = self.ready_tier().await;
        let circuit = self.simulator.circuit(memory_seed, emotion_seed);
        let seed = CircuitSimulator::sampling_seed(memory_seed, emotion_seed);

        if tier == BackendTier::RemoteHardware
            && let Some(remote) = &self.remote
        {
            let sampled = tokio::time::timeout(
                self.remote_timeout,
                remote.sample(&circuit, self.simulator.shots),
            )
            .await
            .unwrap_or_else(|_| Err(EngineError::Backend("remote sample timed out".into())));
            match sampled {
                Ok(raw) => {
                    self.touch();
                    return Ok(self.simulator.finish(&circuit, raw, BackendTier::RemoteHardware));
                }
                Err(e) => tracing::warn!(backend = remote.name(), "falling back to offline sampling: {e}"),
            }
        }

        let sim = Arc::clone(&self.simulator);
        let measurement = if tier == BackendTier::SyntheticDistribution {
            tokio::task::spawn_blocking(move || sim.synthetic_only(&circuit, seed)).await?
        } else {
            tokio::task::spawn_blocking(move || sim.sample_offline(&circuit, seed)).await?
        };
        if measurement.tier != tier && tier != BackendTier::RemoteHardware {
            tracing::warn!(wanted = %tier, got = %measurement.tier, "sampler fell back");
        }
        self.touch();
        Ok(measurement)
    }

    fn touch(&self) {
        *lock(&self.last_measurement_ms) = Some(now_unix_millis());
    }
}
