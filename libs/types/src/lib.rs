//! Types library for the vulnerability-intelligence snapshot service
//!
//! This library provides the core type definitions shared across the
//! aggregator: validated vulnerability identifiers, normalized feed
//! entries, and the snapshot document model served to read-only clients.
//!
//! # Modules
//! - `cve`: Validated vulnerability identifiers (CveId)
//! - `snapshot`: Snapshot document model (RiskItem, VendorSummary, Snapshot)

// Public modules
pub mod cve;
pub mod snapshot;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cve::*;
    pub use crate::snapshot::*;
}
