//! Remote hardware sampler.
//!
//! Contract: `GET {url}/health` answers 2xx when the queue accepts work;
//! `POST {url}/sample` with `{circuit, shots}` returns `{counts}`.

use std::time::Duration;

use async_trait::async_trait;
use qm_core::{Circuit, Counts};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[async_trait]
pub trait RemoteSampler: Send + Sync {
    fn name(&self) -> &str;
    async fn health(&self) -> Result<()>;
    async fn sample(&self, circuit: &Circuit, shots: u64) -> Result<Counts>;
}

#[derive(Serialize)]
struct SampleRequest<'a> {
    circuit: &'a Circuit,
    shots: u64,
}

#[derive(Deserialize)]
struct SampleResponse {
    counts: Counts,
}

pub struct HttpSampler {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSampler {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(timeout)
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

/// Reject counts that do not describe `circuit`.
pub fn validate_counts(circuit: &Circuit, counts: &Counts) -> Result<()> {
    if counts.is_empty() || counts.shots() == 0 {
        return Err(EngineError::Backend("remote returned no counts".into()));
    }
    let width = circuit.total_qubits();
    if let Some((bits, _)) = counts
        .iter()
        .find(|(bits, _)| bits.len() != width || !bits.bytes().all(|b| b == b'0' || b == b'1'))
    {
        return Err(EngineError::Backend(format!(
            "remote bitstring '{bits}' does not match a {width}-qubit circuit"
        )));
    }
    Ok(())
}

#[async_trait]
impl RemoteSampler for HttpSampler {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let resp = self.authorize(self.client.get(&url)).send().await?;
        if !resp.status().is_success() {
            return Err(EngineError::Backend(format!("health check returned {}", resp.status())));
        }
        Ok(())
    }

    async fn sample(&self, circuit: &Circuit, shots: u64) -> Result<Counts> {
        let url = format!("{}/sample", self.base_url);
        let resp = self
            .authorize(self.client.post(&url))
            .json(&SampleRequest { circuit, shots })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(EngineError::Backend(format!("sample returned {status}: {snippet}")));
        }
        let parsed: SampleResponse = resp.json().await?;
        validate_counts(circuit, &parsed.counts)?;
        Ok(parsed.counts)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use qm_core::CircuitParams;

    fn circuit() -> Circuit {
        Circuit::build(1, 2, &CircuitParams::fixed(3, 1), false)
    }

    #[test]
    fn test_valid_counts() {
        let counts = Counts::new(BTreeMap::from([("010".to_string(), 5), ("111".to_string(), 3)]));
        assert!(validate_counts(&circuit(), &counts).is_ok());
    }

    #[test]
    fn test_wrong_width_rejected() {
        let counts = Counts::new(BTreeMap::from([("01".to_string(), 5)]));
        assert!(matches!(validate_counts(&circuit(), &counts), Err(EngineError::Backend(_))));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(validate_counts(&circuit(), &Counts::new(BTreeMap::new())).is_err());
    }

    #[test]
    fn test_request_shape() {
        let c = circuit();
        let json = serde_json::to_value(SampleRequest { circuit: &c, shots: 64 }).unwrap();
        assert_eq!(json["shots"], 64);
        assert!(json["circuit"]["gates"].is_array());
    }

    #[tokio::test]
    async fn test_unreachable_host_errors() {
        let s = HttpSampler::new("http://127.0.0.1:9", None, Duration::from_millis(200));
        assert!(s.health().await.is_err());
        assert!(s.sample(&circuit(), 8).await.is_err());
    }
}
