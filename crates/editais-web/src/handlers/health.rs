//! `GET /healthz`: process and upstream health.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::SharedState;

pub async fn healthz(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let upstream = match state.api.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!(error = %e, "Upstream health check failed");
            "unreachable"
        }
    };

    let catalog = state.catalog.read().await;
    let status = if upstream == "ok" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(json!({
            "status": if upstream == "ok" { "ok" } else { "degraded" },
            "upstream": upstream,
            "catalog_loaded": catalog.is_loaded(),
            "notices": catalog.notices().len(),
            "rejected": catalog.rejected(),
        })),
    )
}
