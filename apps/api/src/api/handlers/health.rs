use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// Health check endpoint
///
/// GET /api/v1/health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
