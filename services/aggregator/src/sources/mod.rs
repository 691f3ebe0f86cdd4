//! Upstream source adapters
//!
//! Each adapter owns one upstream contract:
//! - `kev`: bulk known-exploited feed, fatal on failure
//! - `epss`: batched exploitation-probability scores, per-batch isolated
//! - `nvd`: paced per-item severity lookups with a 7-day memo cache

pub mod epss;
pub mod kev;
pub mod nvd;
