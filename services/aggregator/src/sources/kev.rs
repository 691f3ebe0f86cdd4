//! Bulk feed adapter for the CISA KEV list
//!
//! Fetches the full known-exploited-vulnerabilities list in one call
//! (the GitHub raw mirror; cisa.gov intermittently rejects cloud
//! egress IPs), normalizes each record, orders by date added
//! descending, and keeps the 50 most recent entries. Any failure here
//! is fatal to the whole build.

use std::time::Duration;

use reqwest::header;
use serde::Deserialize;
use tracing::debug;

use types::cve::CveId;
use types::snapshot::{ExploitedEntry, UNKNOWN};

use crate::error::FetchError;
use crate::fetch;

/// GitHub raw mirror of the CISA KEV catalog.
pub const KEV_URL: &str =
    "https://raw.githubusercontent.com/cisagov/kev-data/develop/known_exploited_vulnerabilities.json";

/// Maximum entries retained per build.
pub const TOP_ITEMS: usize = 50;

/// Minimum length of a well-formed `YYYY-MM-DD` date string.
const MIN_DATE_LEN: usize = 10;

#[derive(Debug, Deserialize)]
struct RawKevFeed {
    #[serde(default)]
    vulnerabilities: Vec<RawKevEntry>,
}

/// One raw feed record. The identifier arrives under `cveID` in the
/// current catalog; older exports used `cve`, so both are tolerated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKevEntry {
    #[serde(rename = "cveID")]
    cve_id: Option<String>,
    cve: Option<String>,
    vendor_project: Option<String>,
    product: Option<String>,
    date_added: Option<String>,
}

/// Fetch and normalize the exploited-vulnerabilities list.
pub async fn fetch_exploited(
    client: &reqwest::Client,
    timeout: Duration,
) -> Result<Vec<ExploitedEntry>, FetchError> {
    let request = client
        .get(KEV_URL)
        .header(header::USER_AGENT, "vuln-snapshot-aggregator/0.1")
        .header(header::ACCEPT, "application/json");

    let feed: RawKevFeed = fetch::send_json(request, timeout).await?;
    debug!(records = feed.vulnerabilities.len(), "exploited feed retrieved");

    Ok(normalize(feed.vulnerabilities))
}

/// Normalize raw records into ordered, capped entries.
///
/// Drops records whose identifier is not canonical or whose date is
/// malformed; sorts by date added descending (lexicographic is correct
/// for ISO dates), keeping feed order among equal dates; truncates to
/// [`TOP_ITEMS`].
fn normalize(records: Vec<RawKevEntry>) -> Vec<ExploitedEntry> {
    let mut entries: Vec<ExploitedEntry> = records
        .into_iter()
        .filter_map(|record| {
            let raw_id = record.cve_id.or(record.cve).unwrap_or_default();
            let cve = CveId::parse(&raw_id)?;

            let date_added = record.date_added.unwrap_or_default().trim().to_string();
            if date_added.len() < MIN_DATE_LEN {
                return None;
            }

            Some(ExploitedEntry {
                cve,
                vendor: field_or_unknown(record.vendor_project),
                product: field_or_unknown(record.product),
                date_added,
            })
        })
        .collect();

    // Stable sort keeps original feed order for equal dates.
    entries.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    entries.truncate(TOP_ITEMS);
    entries
}

fn field_or_unknown(value: Option<String>) -> String {
    let trimmed = value.as_deref().unwrap_or(UNKNOWN).trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}
