//! Snapshot builder — orchestrator
//!
//! Drives the three source adapters in sequence, applies the risk
//! scorer, aggregates by vendor, and stamps the result. The bulk feed
//! is the only stage that can fail the build; score adapters degrade
//! their own failures to unknown values, so everything after the bulk
//! fetch always completes.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use types::cve::CveId;
use types::snapshot::{ExploitedEntry, RiskItem, Snapshot};

use crate::config::AggregatorConfig;
use crate::error::BuildError;
use crate::scoring;
use crate::sources::nvd::{NvdClient, SeverityCache};
use crate::sources::{epss, kev, nvd};

/// Builds snapshots from the upstream feeds.
///
/// Owns the shared HTTP client and the long-lived severity cache;
/// constructed once at startup and reused across builds.
pub struct SnapshotBuilder {
    client: reqwest::Client,
    nvd: NvdClient,
    severity_cache: SeverityCache,
    config: AggregatorConfig,
}

impl SnapshotBuilder {
    pub fn new(config: AggregatorConfig) -> Self {
        let client = reqwest::Client::new();
        let nvd = NvdClient::new(
            client.clone(),
            config.nvd_api_key.clone(),
            config.fetch_timeout,
        );

        Self {
            client,
            nvd,
            severity_cache: SeverityCache::with_default_ttl(),
            config,
        }
    }

    /// Build one snapshot.
    ///
    /// Stages: bulk feed (fatal on failure) → unique identifiers →
    /// batch EPSS scores → paced NVD severities for the first
    /// `nvd_lookup_limit` identifiers → score, aggregate, stamp.
    pub async fn build(&self) -> Result<Snapshot, BuildError> {
        info!("snapshot build started");

        let entries = kev::fetch_exploited(&self.client, self.config.fetch_timeout)
            .await
            .map_err(BuildError::BulkFeed)?;
        debug!(entries = entries.len(), "bulk feed normalized");

        let ids = unique_ids(&entries);
        let epss_scores = epss::fetch_scores(&self.client, &ids, self.config.fetch_timeout).await;

        // Identifiers beyond the lookup limit stay unknown without
        // being queried; the limit protects the NVD quota.
        let lookup_ids = &ids[..ids.len().min(self.config.nvd_lookup_limit)];
        let cvss_scores = nvd::fetch_severities(
            &self.nvd,
            &self.severity_cache,
            lookup_ids,
            self.config.nvd_request_delay,
        )
        .await;

        let snapshot = assemble(entries, &epss_scores, &cvss_scores, Utc::now());
        info!(
            items = snapshot.items.len(),
            vendors = snapshot.vendors.len(),
            avg_risk = snapshot.stats.avg_risk,
            "snapshot build finished"
        );

        Ok(snapshot)
    }
}

/// Unique identifiers in first-seen order, so batching stays
/// deterministic across builds of the same feed.
fn unique_ids(entries: &[ExploitedEntry]) -> Vec<CveId> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.cve.clone()))
        .map(|entry| entry.cve.clone())
        .collect()
}

/// Assemble the snapshot document from fetched parts.
///
/// Items keep the date-added-descending order of `entries`. Every item
/// comes from the exploited feed, so the exploited flag is always set
/// when scoring.
fn assemble(
    entries: Vec<ExploitedEntry>,
    epss_scores: &HashMap<CveId, f64>,
    cvss_scores: &HashMap<CveId, Option<f64>>,
    now: DateTime<Utc>,
) -> Snapshot {
    let items: Vec<RiskItem> = entries
        .into_iter()
        .map(|entry| {
            let epss = epss_scores.get(&entry.cve).copied();
            let cvss = cvss_scores.get(&entry.cve).copied().flatten();
            let risk = scoring::risk_score(cvss, epss, true);

            RiskItem {
                cve: entry.cve,
                vendor: entry.vendor,
                product: entry.product,
                kev_added: entry.date_added,
                cvss,
                epss,
                risk,
            }
        })
        .collect();

    let vendors = scoring::vendor_summaries(&items);
    let today = now.format("%Y-%m-%d").to_string();
    let stats = scoring::snapshot_stats(&items, &today);
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    Snapshot {
        updated_at: stamp.clone(),
        served_at: stamp,
        items,
        vendors,
        stats,
    }
}
