//! Snapshot document model
//!
//! The snapshot is the single consistent document the aggregator builds
//! from its upstream feeds and serves to read-only clients. Wire format
//! is camelCase JSON; every struct here is immutable once built — a new
//! build supersedes the previous document, it never mutates it.

use serde::{Deserialize, Serialize};

use crate::cve::CveId;

/// Sentinel used when a feed omits vendor or product.
pub const UNKNOWN: &str = "Unknown";

/// A normalized record from the known-exploited-vulnerabilities feed.
///
/// Produced by the bulk feed adapter after trimming and filtering;
/// discarded after each rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploitedEntry {
    /// Canonical identifier.
    pub cve: CveId,
    /// Vendor name, `"Unknown"` when absent from the feed.
    pub vendor: String,
    /// Product name, `"Unknown"` when absent from the feed.
    pub product: String,
    /// Date the entry was added to the feed, ISO `YYYY-MM-DD`.
    pub date_added: String,
}

/// One scored vulnerability in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    /// Canonical identifier.
    pub cve: CveId,
    /// Vendor name.
    pub vendor: String,
    /// Product name.
    pub product: String,
    /// Date added to the exploited feed, ISO `YYYY-MM-DD`.
    pub kev_added: String,
    /// Severity base score in [0, 10]; `None` means unknown.
    pub cvss: Option<f64>,
    /// Exploitation probability in [0, 1]; `None` means unknown.
    pub epss: Option<f64>,
    /// Derived composite risk in [0, 100]; always present.
    pub risk: u8,
}

/// Per-vendor rollup over the items of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    /// Grouping key.
    pub vendor: String,
    /// Number of items for this vendor, at least 1.
    pub count: usize,
    /// Rounded average risk across the vendor's items.
    pub avg_risk: u8,
    /// Maximum risk across the vendor's items.
    pub max_risk: u8,
}

/// Whole-snapshot statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    /// Items whose `kev_added` equals the current UTC calendar date.
    pub kev_added_today: usize,
    /// Rounded average risk across all items; 0 when there are none.
    pub avg_risk: u8,
}

/// The aggregated snapshot document.
///
/// `updated_at` is stable until the next rebuild; `served_at` is
/// restamped on every read, cache hits included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// RFC 3339 timestamp of when the data was built.
    pub updated_at: String,
    /// RFC 3339 timestamp of when this response was produced.
    pub served_at: String,
    /// Scored items, ordered by `kev_added` descending.
    pub items: Vec<RiskItem>,
    /// Vendor rollups, ordered by average risk descending.
    pub vendors: Vec<VendorSummary>,
    /// Whole-snapshot statistics.
    pub stats: SnapshotStats,
}
