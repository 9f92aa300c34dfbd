use axum::Json;

use crate::dto::{ApiEnvelope, HealthResponse};

pub async fn health_handler() -> Json<ApiEnvelope<HealthResponse>> {
    Json(ApiEnvelope::success(HealthResponse { status: "ok" }))
}
