use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Compliance API",
            "version": version,
            "description": "Task CRUD backend for the compliance-management platform",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "tasks": "/api/tasks (bearer token; GET, POST, PATCH, DELETE)",
            }
        }
    }))
}

/// GET /health - store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": state.store.name(),
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", state.store.name(), e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": state.store.name(),
                        "store_error": e.to_string()
                    }
                })),
            )
        }
    }
}
