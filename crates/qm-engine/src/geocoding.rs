//! Geocoding collaborator.
//!
//! Any failure here is recoverable: the synthesizer falls back to regional
//! reference coordinates, so callers only log errors.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use qm_core::constants::CONTEXT_CONFIDENCE_CAP;
use qm_core::hashing::StableHasher;
use qm_core::{Country, GeocodeRequest, GeocodeResult, LruTtlCache};
use reqwest::Client;
use serde::Deserialize;

use crate::config::GeocodingConfig;
use crate::error::{EngineError, Result};

#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &str;
    /// `Ok(None)` when nothing matched.
    async fn geocode(&self, request: &GeocodeRequest) -> Result<Option<GeocodeResult>>;
}

/// Geocoder that never resolves anything. Used when geocoding is off.
pub struct NullGeocoder;

#[async_trait]
impl Geocoder for NullGeocoder {
    fn name(&self) -> &str {
        "none"
    }

    async fn geocode(&self, _request: &GeocodeRequest) -> Result<Option<GeocodeResult>> {
        Ok(None)
    }
}

/// Country-qualified queries first, then the bare name, then "name landmark".
pub fn search_queries(name: &str, hint: Option<Country>) -> Vec<String> {
    let qualified: &[&str] = match hint {
        Some(Country::Japan) => &["{}, Japan", "{}, 日本", "{}, Kyoto, Japan", "{}, Tokyo, Japan"],
        Some(Country::France) => &["{}, Paris, France", "{}, France", "{}, Île-de-France, France"],
        Some(Country::Italy) => &["{}, Italy", "{}, Rome, Italy", "{}, Florence, Italy", "{}, Italia"],
        Some(Country::Uk) => &["{}, London, UK", "{}, United Kingdom", "{}, England"],
        Some(Country::Usa) => &["{}, New York, USA", "{}, United States", "{}, California, USA"],
        Some(Country::Unknown) | None => &[],
    };
    qualified
        .iter()
        .map(|pattern| pattern.replacen("{}", name, 1))
        .chain([name.to_string(), format!("{name} landmark")])
        .collect()
}

/// Map a free-form country name from the geocoder onto a supported country.
pub fn normalize_country(raw: &str) -> Country {
    const MAPPINGS: &[(&str, Country)] = &[
        ("french republic", Country::France),
        ("france", Country::France),
        ("japan", Country::Japan),
        ("日本", Country::Japan),
        ("italia", Country::Italy),
        ("italy", Country::Italy),
        ("united kingdom", Country::Uk),
        ("england", Country::Uk),
        ("scotland", Country::Uk),
        ("britain", Country::Uk),
        ("united states", Country::Usa),
        ("america", Country::Usa),
    ];
    let lower = raw.to_lowercase();
    MAPPINGS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, c)| *c)
        .unwrap_or(Country::Unknown)
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    importance: Option<f64>,
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    country: Option<String>,
}

impl Place {
    fn into_result(self) -> Result<GeocodeResult> {
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| EngineError::Geocoding(format!("bad coordinate '{s}': {e}")))
        };
        let country = self.address.country.unwrap_or_default();
        let normalized = normalize_country(&country);
        Ok(GeocodeResult {
            lat: parse(&self.lat)?,
            lng: parse(&self.lon)?,
            formatted_address: self.display_name,
            country: if normalized.is_known() {
                normalized.as_str().to_string()
            } else {
                country.to_lowercase()
            },
            confidence: self.importance.unwrap_or(0.5).clamp(0.0, CONTEXT_CONFIDENCE_CAP),
            source: "nominatim".to_string(),
        })
    }
}

/// OpenStreetMap Nominatim client with rate limiting and a result cache.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    min_interval: Duration,
    max_queries: usize,
    last_request: tokio::sync::Mutex<Option<Instant>>,
    cache: Mutex<LruTtlCache<u64, Option<GeocodeResult>>>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: Client::builder()
                .connect_timeout(timeout)
                .timeout(timeout)
                .user_agent(config.user_agent.clone())
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            min_interval: Duration::from_millis(config.min_interval_ms),
            max_queries: config.max_queries.max(1),
            last_request: tokio::sync::Mutex::new(None),
            cache: Mutex::new(LruTtlCache::new(
                config.cache_entries,
                Duration::from_secs(config.cache_ttl_secs),
            )),
        }
    }

    fn cache_key(request: &GeocodeRequest) -> u64 {
        let hint = request.country_hint.map(|c| c.as_str()).unwrap_or("global");
        StableHasher::new().str(&request.location_name).str(hint).finish()
    }

    /// One search, spaced at least `min_interval` after the previous one.
    async fn search(&self, query: &str) -> Result<Option<GeocodeResult>> {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        let sent = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
                ("accept-language", "en"),
            ])
            .send()
            .await;
        *last = Some(Instant::now());
        drop(last);

        let resp = sent?;
        if !resp.status().is_success() {
            return Err(EngineError::Geocoding(format!("nominatim returned {}", resp.status())));
        }
        let places: Vec<Place> = resp.json().await?;
        places.into_iter().next().map(Place::into_result).transpose()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn geocode(&self, request: &GeocodeRequest) -> Result<Option<GeocodeResult>> {
        let key = Self::cache_key(request);
        let cached = self.cache.lock().unwrap_or_else(|e| e.into_inner()).get(&key);
        if let Some(hit) = cached {
            tracing::debug!(location = %request.location_name, "geocoding cache hit");
            return Ok(hit);
        }

        let mut last_error = None;
        let mut found = None;
        for query in search_queries(&request.location_name, request.country_hint)
            .into_iter()
            .take(self.max_queries)
        {
            match self.search(&query).await {
                Ok(Some(result)) => {
                    found = Some(result);
                    break;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(%query, "geocoding query failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        if let Some(result) = &found
            && let Some(expected) = request.country_hint
            && Country::from_str_lossy(&result.country) != expected
        {
            tracing::warn!(
                location = %request.location_name,
                expected = %expected,
                got = %result.country,
                "geocoded country mismatch"
            );
        }

        // only cache definitive answers, not transport failures
        if found.is_some() || last_error.is_none() {
            self.cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key, found.clone());
            return Ok(found);
        }
        Err(last_error.unwrap_or_else(|| EngineError::Geocoding("no result".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qm_core::GeographicContext;

    #[test]
    fn test_queries_country_first() {
        let q = search_queries("Gion", Some(Country::Japan));
        assert_eq!(q[0], "Gion, Japan");
        assert_eq!(q[1], "Gion, 日本");
        assert_eq!(q[q.len() - 2], "Gion");
        assert_eq!(q[q.len() - 1], "Gion landmark");
    }

    #[test]
    fn test_queries_without_hint() {
        assert_eq!(search_queries("Somewhere", None), vec!["Somewhere", "Somewhere landmark"]);
    }

    #[test]
    fn test_normalize_country() {
        assert_eq!(normalize_country("French Republic"), Country::France);
        assert_eq!(normalize_country("日本"), Country::Japan);
        assert_eq!(normalize_country("United States of America"), Country::Usa);
        assert_eq!(normalize_country("United Kingdom"), Country::Uk);
        assert_eq!(normalize_country("Atlantis"), Country::Unknown);
    }

    #[test]
    fn test_place_confidence_capped() {
        let place: Place = serde_json::from_str(
            r#"{"lat":"35.0","lon":"135.7","display_name":"Kyoto","importance":0.97,"address":{"country":"Japan"}}"#,
        )
        .unwrap();
        let r = place.into_result().unwrap();
        assert_eq!(r.confidence, CONTEXT_CONFIDENCE_CAP);
        assert_eq!(r.country, "japan");
        assert_eq!(r.lng, 135.7);
    }

    #[test]
    fn test_place_bad_coordinate() {
        let place: Place = serde_json::from_str(r#"{"lat":"north","lon":"1"}"#).unwrap();
        assert!(matches!(place.into_result(), Err(EngineError::Geocoding(_))));
    }

    #[tokio::test]
    async fn test_null_geocoder() {
        let req = GeocodeRequest {
            location_name: "x".into(),
            country_hint: None,
            context: GeographicContext::unknown(),
        };
        assert_eq!(NullGeocoder.geocode(&req).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_nominatim_errors() {
        let config = GeocodingConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 1,
            min_interval_ms: 0,
            max_queries: 1,
            ..GeocodingConfig::default()
        };
        let g = NominatimGeocoder::new(&config);
        let req = GeocodeRequest {
            location_name: "Gion".into(),
            country_hint: Some(Country::Japan),
            context: GeographicContext::unknown(),
        };
        assert!(g.geocode(&req).await.is_err());
    }
}
