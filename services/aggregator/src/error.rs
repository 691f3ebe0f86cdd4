//! Error taxonomy for the aggregator
//!
//! Three layers: `FetchError` for a single outbound call, `BuildError`
//! for a whole snapshot build (only the bulk feed can fail it), and
//! `AppError` for the HTTP surface. Rate limiting upstream (429) is an
//! ordinary `HttpStatus` case; score adapters degrade it to unknown
//! like any other non-success status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single outbound call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no response within the call deadline")]
    Timeout,

    #[error("unexpected http status {0}")]
    HttpStatus(u16),

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// Failure of a snapshot build.
///
/// The batch and per-item score adapters absorb their own failures as
/// unknown scores, so the bulk feed is the only fatal path.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("exploited-vulnerabilities feed unavailable: {0}")]
    BulkFeed(#[source] FetchError),
}

/// Central error type for the HTTP surface.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("snapshot build failed: {0}")]
    BuildFailed(#[from] BuildError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::BuildFailed(err) => {
                (StatusCode::BAD_GATEWAY, err.to_string(), "UPSTREAM_FEED_UNAVAILABLE")
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_maps_to_bad_gateway() {
        let err = AppError::BuildFailed(BuildError::BulkFeed(FetchError::Timeout));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_error_maps_to_500() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(
            FetchError::HttpStatus(429).to_string(),
            "unexpected http status 429"
        );
        assert_eq!(
            FetchError::Timeout.to_string(),
            "no response within the call deadline"
        );
    }
}
