use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/snapshot` — the current snapshot document.
///
/// Serves the cached snapshot when fresh, otherwise builds a new one;
/// either way the response is a complete, internally consistent
/// document. `no-store` keeps intermediate caches from serving stale
/// data independently of the process-internal TTL.
pub async fn get_snapshot(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let builder = state.builder.clone();
    let snapshot = state
        .cache
        .get_or_build(move || async move { builder.build().await })
        .await?;

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(snapshot)))
}
