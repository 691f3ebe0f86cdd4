//! Vulnerability-Intelligence Snapshot Aggregator
//!
//! Joins three independent, rate-limited public feeds into a single
//! consistent snapshot document served to read-only clients:
//! - CISA KEV bulk feed of known-exploited vulnerabilities
//! - FIRST EPSS batched exploitation-probability API
//! - NVD per-item severity API under a strict request quota
//!
//! # Architecture
//!
//! ```text
//!  GET /api/snapshot
//!        │
//!   ┌────▼─────────┐   stale / empty   ┌─────────────────┐
//!   │SnapshotCache │──────────────────▶│ SnapshotBuilder │
//!   └────┬─────────┘                   └───┬────┬────┬───┘
//!        │ fresh (< 10 min)                │    │    │
//!        ▼                              ┌──▼─┐┌─▼──┐┌─▼──┐
//!   restamped clone                     │KEV ││EPSS││NVD │
//!                                       └────┘└────┘└────┘
//! ```
//!
//! The KEV fetch is the only fatal path; EPSS and NVD failures degrade
//! to unknown scores and never abort a build.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod router;
pub mod scoring;
pub mod sources;
pub mod state;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
