//! Health check handler.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Health check handler.
///
/// Pings the entity store and reports the result. Always answers 200 so
/// that probes can read the body.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "store": "healthy"
/// }
/// ```
#[instrument(skip_all, name = "casting.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(target: "casting.health", error = %e, "Entity store ping failed");
            "unhealthy"
        }
    };

    Json(HealthResponse {
        status: store_status.to_string(),
        store: store_status.to_string(),
    })
}
