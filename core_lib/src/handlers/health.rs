//! Health check handlers

use crate::{models::ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::warn;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.file_manager.storage_stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().timestamp(),
                "version": state.version,
                "storage": stats,
                "max_upload_mb": state.max_upload_mb(),
            }))),
        ),
        Err(e) => {
            warn!("Storage health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error(format!("Storage unavailable: {}", e))),
            )
        }
    }
}
