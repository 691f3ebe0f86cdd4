//! Aggregator configuration
//!
//! Resolved once at startup from the environment. The per-item NVD
//! source distinguishes an authenticated quota (50 requests per 30 s)
//! from an anonymous one (5 per 30 s); both the lookup limit per build
//! and the inter-request delay follow from whether a key is present,
//! with an env override for the limit.

use std::net::SocketAddr;
use std::time::Duration;

/// Snapshot cache time-to-live.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(10 * 60);

/// Per-identifier severity cache time-to-live.
pub const SEVERITY_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Deadline for each outbound call.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// NVD lookups per build with an API key.
const LOOKUP_LIMIT_AUTHENTICATED: usize = 30;
/// NVD lookups per build without one.
const LOOKUP_LIMIT_ANONYMOUS: usize = 10;

/// Inter-request delay with an API key (safe margin under 50/30s).
const DELAY_AUTHENTICATED_MS: u64 = 350;
/// Inter-request delay without one (safe margin under 5/30s).
const DELAY_ANONYMOUS_MS: u64 = 6500;

/// Aggregator service configuration.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Optional NVD credential, sent as the `apiKey` request header.
    pub nvd_api_key: Option<String>,
    /// Maximum per-item severity lookups per build.
    pub nvd_lookup_limit: usize,
    /// Mandatory delay between consecutive severity lookups.
    pub nvd_request_delay: Duration,
    /// Snapshot cache time-to-live.
    pub snapshot_ttl: Duration,
    /// Deadline for each outbound call.
    pub fetch_timeout: Duration,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

impl AggregatorConfig {
    /// Resolve configuration from the environment.
    ///
    /// Reads `NVD_API_KEY` (optional credential) and `NVD_LOOKUP_LIMIT`
    /// (optional override for lookups per build).
    pub fn from_env() -> Self {
        let api_key = std::env::var("NVD_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let limit_override = std::env::var("NVD_LOOKUP_LIMIT")
            .ok()
            .and_then(|raw| raw.trim().parse().ok());

        Self::resolve(api_key, limit_override)
    }

    fn resolve(nvd_api_key: Option<String>, limit_override: Option<usize>) -> Self {
        let authenticated = nvd_api_key.is_some();
        let default_limit = if authenticated {
            LOOKUP_LIMIT_AUTHENTICATED
        } else {
            LOOKUP_LIMIT_ANONYMOUS
        };
        let delay_ms = if authenticated {
            DELAY_AUTHENTICATED_MS
        } else {
            DELAY_ANONYMOUS_MS
        };

        Self {
            nvd_api_key,
            nvd_lookup_limit: limit_override.unwrap_or(default_limit),
            nvd_request_delay: Duration::from_millis(delay_ms),
            snapshot_ttl: SNAPSHOT_TTL,
            fetch_timeout: FETCH_TIMEOUT,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}
