//! Risk scoring and aggregation
//!
//! Pure functions over snapshot items: the composite risk formula, the
//! per-vendor rollup, and the whole-snapshot statistics. No I/O.

use std::collections::HashMap;

use types::snapshot::{RiskItem, SnapshotStats, VendorSummary, UNKNOWN};

/// Vendor rows retained per snapshot.
pub const VENDOR_ROWS: usize = 18;

/// Weight of the severity part of the composite score.
const SEVERITY_WEIGHT: f64 = 0.35;
/// Weight of the exploitation-probability part.
const PROBABILITY_WEIGHT: f64 = 0.65;
/// Flat bonus for confirmed in-the-wild exploitation.
const EXPLOITED_BONUS: f64 = 0.20;

/// Composite risk in [0, 100].
///
/// `0.35 * severity/10 + 0.65 * probability + 0.20 if exploited`,
/// clamped to [0, 1] and scaled. Absent inputs contribute zero, so an
/// item with no signal beyond confirmed exploitation still registers
/// a risk of 20. Probability dominates by design; exploitation is a
/// flat bonus, not a multiplier.
pub fn risk_score(cvss: Option<f64>, epss: Option<f64>, exploited: bool) -> u8 {
    let severity_part = cvss.map_or(0.0, |score| score / 10.0);
    let probability_part = epss.unwrap_or(0.0);
    let bonus = if exploited { EXPLOITED_BONUS } else { 0.0 };

    let base = SEVERITY_WEIGHT * severity_part + PROBABILITY_WEIGHT * probability_part + bonus;
    (base.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Roll items up by vendor.
///
/// Groups by trimmed vendor name (blank falls back to `"Unknown"`),
/// computes count, rounded average risk and maximum risk per group,
/// orders by average risk descending (vendor name ascending breaks
/// ties deterministically), and keeps the top [`VENDOR_ROWS`].
pub fn vendor_summaries(items: &[RiskItem]) -> Vec<VendorSummary> {
    // vendor -> (count, risk sum, max risk)
    let mut groups: HashMap<String, (usize, u32, u8)> = HashMap::new();

    for item in items {
        let trimmed = item.vendor.trim();
        let key = if trimmed.is_empty() { UNKNOWN } else { trimmed };

        let entry = groups.entry(key.to_string()).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += u32::from(item.risk);
        entry.2 = entry.2.max(item.risk);
    }

    let mut vendors: Vec<VendorSummary> = groups
        .into_iter()
        .map(|(vendor, (count, sum, max_risk))| VendorSummary {
            vendor,
            count,
            avg_risk: (sum as f64 / count as f64).round() as u8,
            max_risk,
        })
        .collect();

    vendors.sort_by(|a, b| {
        b.avg_risk
            .cmp(&a.avg_risk)
            .then_with(|| a.vendor.cmp(&b.vendor))
    });
    vendors.truncate(VENDOR_ROWS);
    vendors
}

/// Whole-snapshot statistics.
///
/// `today` is the current UTC calendar date as `YYYY-MM-DD`; the
/// average over zero items is 0.
pub fn snapshot_stats(items: &[RiskItem], today: &str) -> SnapshotStats {
    let avg_risk = if items.is_empty() {
        0
    } else {
        let sum: u32 = items.iter().map(|item| u32::from(item.risk)).sum();
        (sum as f64 / items.len() as f64).round() as u8
    };

    SnapshotStats {
        kev_added_today: items.iter().filter(|item| item.kev_added == today).count(),
        avg_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::cve::CveId;

    fn item(vendor: &str, risk: u8, date: &str) -> RiskItem {
        RiskItem {
            cve: CveId::parse("CVE-2024-0001").unwrap(),
            vendor: vendor.to_string(),
            product: "Widget".to_string(),
            kev_added: date.to_string(),
            cvss: None,
            epss: None,
            risk,
        }
    }

    #[test]
    fn test_risk_no_signal_is_zero() {
        assert_eq!(risk_score(None, None, false), 0);
    }

    #[test]
    fn test_risk_exploited_alone_scores_twenty() {
        assert_eq!(risk_score(None, None, true), 20);
    }

    #[test]
    fn test_risk_clamps_at_hundred() {
        // 0.35 + 0.65 + 0.20 = 1.20 before the clamp
        assert_eq!(risk_score(Some(10.0), Some(1.0), true), 100);
    }

    #[test]
    fn test_risk_weighted_sum() {
        // 0.35 * 0.5 + 0.65 * 0.4 = 0.435 -> 44 (rounded)
        assert_eq!(risk_score(Some(5.0), Some(0.4), false), 44);
    }

    #[test]
    fn test_risk_stays_in_bounds() {
        for cvss in [None, Some(0.0), Some(5.5), Some(10.0)] {
            for epss in [None, Some(0.0), Some(0.5), Some(1.0)] {
                for exploited in [false, true] {
                    let risk = risk_score(cvss, epss, exploited);
                    assert!(risk <= 100);
                }
            }
        }
    }

    #[test]
    fn test_vendor_rollup_counts_and_ordering() {
        let items = vec![
            item("VendorA", 80, "2024-01-01"),
            item("VendorA", 60, "2024-01-02"),
            item("VendorB", 90, "2024-01-03"),
        ];
        let vendors = vendor_summaries(&items);

        assert_eq!(vendors.len(), 2);
        // Higher average first
        assert_eq!(vendors[0].vendor, "VendorB");
        assert_eq!(vendors[0].count, 1);
        assert_eq!(vendors[0].avg_risk, 90);
        assert_eq!(vendors[0].max_risk, 90);

        assert_eq!(vendors[1].vendor, "VendorA");
        assert_eq!(vendors[1].count, 2);
        assert_eq!(vendors[1].avg_risk, 70);
        assert_eq!(vendors[1].max_risk, 80);
    }

    #[test]
    fn test_vendor_blank_falls_back_to_unknown() {
        let items = vec![item("  ", 50, "2024-01-01"), item("Unknown", 30, "2024-01-02")];
        let vendors = vendor_summaries(&items);

        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].vendor, "Unknown");
        assert_eq!(vendors[0].count, 2);
        assert_eq!(vendors[0].avg_risk, 40);
    }

    #[test]
    fn test_vendor_rows_capped() {
        let items: Vec<RiskItem> = (0..30)
            .map(|i| item(&format!("Vendor{:02}", i), 50, "2024-01-01"))
            .collect();
        assert_eq!(vendor_summaries(&items).len(), VENDOR_ROWS);
    }

    #[test]
    fn test_vendor_equal_averages_order_by_name() {
        let items = vec![item("Beta", 50, "2024-01-01"), item("Alpha", 50, "2024-01-02")];
        let vendors = vendor_summaries(&items);
        assert_eq!(vendors[0].vendor, "Alpha");
        assert_eq!(vendors[1].vendor, "Beta");
    }

    #[test]
    fn test_stats_counts_today_and_averages() {
        let items = vec![
            item("A", 80, "2026-08-23"),
            item("B", 60, "2026-08-23"),
            item("C", 10, "2024-01-01"),
        ];
        let stats = snapshot_stats(&items, "2026-08-23");
        assert_eq!(stats.kev_added_today, 2);
        assert_eq!(stats.avg_risk, 50);
    }

    #[test]
    fn test_stats_empty_snapshot() {
        let stats = snapshot_stats(&[], "2026-08-23");
        assert_eq!(stats.kev_added_today, 0);
        assert_eq!(stats.avg_risk, 0);
    }
}
