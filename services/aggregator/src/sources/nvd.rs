//! Per-item score adapter for the NVD CVE API
//!
//! NVD allows one identifier per call under a strict quota (5 per 30 s
//! anonymous, 50 per 30 s with a key), so lookups run strictly
//! sequentially with a mandatory inter-request delay. Results — failed
//! lookups included — are memoized in a 7-day cache so repeat builds
//! don't spend quota on identifiers already resolved.
//!
//! This adapter never fails a build: every network or parsing problem
//! degrades to an unknown severity for that identifier only.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use types::cve::CveId;

use crate::config::SEVERITY_TTL;
use crate::error::FetchError;
use crate::fetch;

/// NVD CVE API 2.0 endpoint.
pub const NVD_BASE: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// CVSS metric arrays probed newest to oldest.
const METRIC_VERSIONS: [&str; 4] = [
    "cvssMetricV40",
    "cvssMetricV31",
    "cvssMetricV30",
    "cvssMetricV2",
];

/// Seam for the single-identifier severity lookup.
///
/// The production implementation is [`NvdClient`]; tests substitute a
/// fake to exercise pacing and caching without the network.
#[async_trait]
pub trait SeverityLookup: Send + Sync {
    /// Look up the severity base score for one identifier.
    ///
    /// `Ok(None)` means the record exists but carries no usable metric.
    async fn lookup(&self, cve: &CveId) -> Result<Option<f64>, FetchError>;
}

/// NVD API client.
pub struct NvdClient {
    client: reqwest::Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl NvdClient {
    pub fn new(client: reqwest::Client, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Deserialize)]
struct NvdVulnerability {
    cve: Option<NvdCve>,
}

#[derive(Debug, Deserialize)]
struct NvdCve {
    metrics: Option<Value>,
}

#[async_trait]
impl SeverityLookup for NvdClient {
    async fn lookup(&self, cve: &CveId) -> Result<Option<f64>, FetchError> {
        let mut request = self
            .client
            .get(NVD_BASE)
            .query(&[("cveId", cve.as_str())])
            .header(header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("apiKey", key);
        }

        let response: NvdResponse = fetch::send_json(request, self.timeout).await?;
        let score = response
            .vulnerabilities
            .first()
            .and_then(|vuln| vuln.cve.as_ref())
            .and_then(|cve| cve.metrics.as_ref())
            .and_then(extract_base_score);

        Ok(score)
    }
}

/// Extract a CVSS base score from the NVD metrics object.
///
/// NVD keys metric arrays by scoring-system revision; the first array
/// (newest revision first) whose leading element carries a numeric
/// `cvssData.baseScore` wins.
pub fn extract_base_score(metrics: &Value) -> Option<f64> {
    for version in METRIC_VERSIONS {
        let score = metrics
            .get(version)
            .and_then(|arr| arr.get(0))
            .and_then(|metric| metric.get("cvssData"))
            .and_then(|data| data.get("baseScore"))
            .and_then(Value::as_f64);
        if let Some(score) = score {
            if score.is_finite() {
                return Some(score);
            }
        }
    }
    None
}

struct CachedSeverity {
    fetched_at: Instant,
    score: Option<f64>,
}

/// Per-identifier severity cache with its own time-to-live, separate
/// from the snapshot cache. Failed lookups are cached too, capping the
/// retry cost of identifiers NVD cannot resolve.
pub struct SeverityCache {
    entries: DashMap<CveId, CachedSeverity>,
    ttl: Duration,
}

impl SeverityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cache with the standard 7-day time-to-live.
    pub fn with_default_ttl() -> Self {
        Self::new(SEVERITY_TTL)
    }

    /// Outer `Some` means a fresh cached outcome exists; the inner
    /// option is the memoized severity (possibly unknown).
    fn get_fresh(&self, cve: &CveId) -> Option<Option<f64>> {
        let entry = self.entries.get(cve)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.score)
        } else {
            None
        }
    }

    fn store(&self, cve: CveId, score: Option<f64>) {
        self.entries.insert(
            cve,
            CachedSeverity {
                fetched_at: Instant::now(),
                score,
            },
        );
    }
}

/// Fetch severity scores for the given identifiers, in order.
///
/// Cache hits skip both the network call and the delay. Every miss
/// costs one lookup followed by the mandatory `delay` — sequential
/// pacing is a correctness requirement against the upstream quota, so
/// no parallelism here.
pub async fn fetch_severities<L: SeverityLookup + ?Sized>(
    lookup: &L,
    cache: &SeverityCache,
    ids: &[CveId],
    delay: Duration,
) -> HashMap<CveId, Option<f64>> {
    let mut out = HashMap::new();

    for cve in ids {
        if let Some(score) = cache.get_fresh(cve) {
            out.insert(cve.clone(), score);
            continue;
        }

        let score = match lookup.lookup(cve).await {
            Ok(score) => score,
            Err(err) => {
                warn!(cve = %cve, error = %err, "severity lookup failed, recorded as unknown");
                None
            }
        };

        cache.store(cve.clone(), score);
        out.insert(cve.clone(), score);

        tokio::time::sleep(delay).await;
    }

    debug!(requested = ids.len(), "severity lookups complete");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    struct FakeLookup {
        calls: AtomicUsize,
        outcome: Result<Option<f64>, ()>,
    }

    impl FakeLookup {
        fn returning(score: Option<f64>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(score),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SeverityLookup for FakeLookup {
        async fn lookup(&self, _cve: &CveId) -> Result<Option<f64>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(score) => Ok(score),
                Err(()) => Err(FetchError::HttpStatus(429)),
            }
        }
    }

    fn one_id() -> Vec<CveId> {
        vec![CveId::parse("CVE-2024-21762").unwrap()]
    }

    #[test]
    fn test_extract_prefers_newest_metric_version() {
        let metrics = json!({
            "cvssMetricV31": [{"cvssData": {"baseScore": 7.5}}],
            "cvssMetricV40": [{"cvssData": {"baseScore": 9.1}}]
        });
        assert_eq!(extract_base_score(&metrics), Some(9.1));
    }

    #[test]
    fn test_extract_falls_back_to_older_versions() {
        let metrics = json!({
            "cvssMetricV2": [{"cvssData": {"baseScore": 6.8}}]
        });
        assert_eq!(extract_base_score(&metrics), Some(6.8));
    }

    #[test]
    fn test_extract_skips_non_numeric_score() {
        let metrics = json!({
            "cvssMetricV31": [{"cvssData": {"baseScore": "HIGH"}}],
            "cvssMetricV2": [{"cvssData": {"baseScore": 4.3}}]
        });
        assert_eq!(extract_base_score(&metrics), Some(4.3));
    }

    #[test]
    fn test_extract_none_when_no_metrics_present() {
        assert_eq!(extract_base_score(&json!({})), None);
        assert_eq!(extract_base_score(&json!({"cvssMetricV31": []})), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_within_ttl_skips_network() {
        let fake = FakeLookup::returning(Some(9.8));
        let cache = SeverityCache::with_default_ttl();
        let ids = one_id();

        let first = fetch_severities(&fake, &cache, &ids, Duration::ZERO).await;
        let second = fetch_severities(&fake, &cache, &ids, Duration::ZERO).await;

        assert_eq!(fake.call_count(), 1);
        assert_eq!(first[&ids[0]], Some(9.8));
        assert_eq!(second[&ids[0]], Some(9.8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_seven_days() {
        let fake = FakeLookup::returning(Some(9.8));
        let cache = SeverityCache::with_default_ttl();
        let ids = one_id();

        fetch_severities(&fake, &cache, &ids, Duration::ZERO).await;
        tokio::time::advance(WEEK + Duration::from_secs(1)).await;
        fetch_severities(&fake, &cache, &ids, Duration::ZERO).await;

        assert_eq!(fake.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_memoized_as_unknown() {
        let fake = FakeLookup::failing();
        let cache = SeverityCache::with_default_ttl();
        let ids = one_id();

        let first = fetch_severities(&fake, &cache, &ids, Duration::ZERO).await;
        let second = fetch_severities(&fake, &cache, &ids, Duration::ZERO).await;

        // The failure itself is cached for the full window.
        assert_eq!(fake.call_count(), 1);
        assert_eq!(first[&ids[0]], None);
        assert_eq!(second[&ids[0]], None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_misses_are_paced_by_the_delay() {
        let fake = FakeLookup::returning(Some(5.0));
        let cache = SeverityCache::with_default_ttl();
        let ids: Vec<CveId> = (0..3)
            .map(|i| CveId::parse(&format!("CVE-2024-{:04}", i)).unwrap())
            .collect();
        let delay = Duration::from_millis(6500);

        let started = Instant::now();
        fetch_severities(&fake, &cache, &ids, delay).await;

        // One delay after each of the three misses.
        assert_eq!(started.elapsed(), delay * 3);
        assert_eq!(fake.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hits_skip_the_delay() {
        let fake = FakeLookup::returning(Some(5.0));
        let cache = SeverityCache::with_default_ttl();
        let ids = one_id();
        let delay = Duration::from_millis(6500);

        fetch_severities(&fake, &cache, &ids, delay).await;

        let started = Instant::now();
        fetch_severities(&fake, &cache, &ids, delay).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
