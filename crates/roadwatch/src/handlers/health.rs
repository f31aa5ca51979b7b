use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - Liveness check.
///
/// Returns 200 immediately without touching storage or the cache.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
