//! Validated vulnerability identifiers
//!
//! Upstream feeds disagree on field names and casing; every identifier
//! entering the system goes through `CveId::parse`, so downstream code
//! can rely on the canonical uppercase `CVE-` form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical vulnerability identifier (e.g. `CVE-2024-21762`).
///
/// Construction is only possible through [`CveId::parse`], which trims
/// surrounding whitespace and rejects anything without the uppercase
/// `CVE-` prefix. Serializes transparently as the plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CveId(String);

impl CveId {
    /// Parse a raw identifier, trimming whitespace.
    ///
    /// Returns `None` for empty input or input that does not carry the
    /// canonical uppercase prefix (`cve-2024-0001` is rejected).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with("CVE-") {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, used for batch packing.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the identifier is empty (never the case for parsed IDs).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
