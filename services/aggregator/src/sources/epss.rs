//! Batch score adapter for the FIRST EPSS API
//!
//! EPSS accepts many identifiers per call, comma-joined in the `cve`
//! query parameter, but caps the combined parameter length. Identifiers
//! are greedily packed into batches under that ceiling and fetched one
//! batch at a time. A failed batch only loses its own scores; the rest
//! still contribute, matching the per-item adapter's isolation.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use types::cve::CveId;

use crate::fetch;

/// FIRST EPSS API endpoint.
pub const EPSS_BASE: &str = "https://api.first.org/data/v1/epss";

/// Ceiling on the combined identifier length per call, separators
/// included. The documented parameter limit is around 2000 characters;
/// 1800 leaves a safe margin.
const MAX_QUERY_LEN: usize = 1800;

#[derive(Debug, Deserialize)]
struct EpssResponse {
    #[serde(default)]
    data: Vec<EpssRow>,
}

/// One response row. The score arrives as a JSON number or as a
/// numeric string depending on the endpoint revision.
#[derive(Debug, Deserialize)]
struct EpssRow {
    cve: String,
    epss: Value,
}

/// Fetch exploitation-probability scores for the given identifiers.
///
/// Returns a map from identifier to probability in [0, 1]. Identifiers
/// missing from the map are unknown, never zero. This adapter does not
/// fail the build: a failed batch is logged and skipped.
pub async fn fetch_scores(
    client: &reqwest::Client,
    ids: &[CveId],
    timeout: Duration,
) -> HashMap<CveId, f64> {
    let mut scores = HashMap::new();

    for batch in pack_batches(ids) {
        let joined = batch
            .iter()
            .map(CveId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let request = client.get(EPSS_BASE).query(&[("cve", joined.as_str())]);

        match fetch::send_json::<EpssResponse>(request, timeout).await {
            Ok(response) => {
                for row in response.data {
                    let id = CveId::parse(&row.cve);
                    let score = parse_score(&row.epss);
                    if let (Some(id), Some(score)) = (id, score) {
                        scores.insert(id, score);
                    }
                }
            }
            Err(err) => {
                warn!(
                    batch_size = batch.len(),
                    error = %err,
                    "EPSS batch failed, its scores stay unknown"
                );
            }
        }
    }

    debug!(requested = ids.len(), scored = scores.len(), "EPSS scores merged");
    scores
}

/// Greedily pack identifiers into batches whose comma-joined length
/// stays at or under [`MAX_QUERY_LEN`].
///
/// An identifier joins the current batch while
/// `current_len + separator + id_len` fits; otherwise it starts a new
/// batch. Every input identifier lands in exactly one batch.
pub fn pack_batches(ids: &[CveId]) -> Vec<Vec<CveId>> {
    let mut batches: Vec<Vec<CveId>> = Vec::new();
    let mut current: Vec<CveId> = Vec::new();
    let mut current_len = 0usize;

    for id in ids {
        let added = if current.is_empty() { id.len() } else { 1 + id.len() };
        if current_len + added > MAX_QUERY_LEN {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
            }
            current_len = id.len();
            current.push(id.clone());
        } else {
            current_len += added;
            current.push(id.clone());
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
