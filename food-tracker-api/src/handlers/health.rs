use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn live() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready when the database (if any) answers and the nutrition API is reachable.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = food_tracker_storage::postgres::health_check(pool).await {
            tracing::warn!(error = %e, "Readiness: database unavailable");
            return unavailable(format!("database: {e}"));
        }
    }

    if let Err(e) = state.nutrition.ping().await {
        tracing::warn!(error = %e, "Readiness: nutrition API unavailable");
        return unavailable(format!("nutrition API: {e}"));
    }

    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

fn unavailable(reason: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unavailable", "error": reason })),
    )
}
