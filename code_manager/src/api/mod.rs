pub mod execute;
pub mod grade;
pub mod response;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::response::ApiResponse;
use crate::manager::queue::QueueStats;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/execute", post(execute::execute))
        .route("/validate", post(execute::validate))
        .route("/grade/question", post(grade::grade_question))
        .route("/grade/attempt", post(grade::grade_attempt))
        .route("/grade/attempt/submit", post(grade::submit_attempt))
        .route("/grade/attempt/{attempt_id}", get(grade::attempt_status))
        .with_state(state)
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "code_manager is running")
}

/// GET /stats
///
/// Current run-slot usage:
/// ```json
/// { "success": true, "data": { "running": 2, "waiting": 0, "maxConcurrent": 4 }, "message": "Queue stats" }
/// ```
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<QueueStats>> {
    Json(ApiResponse::success(state.manager.stats(), "Queue stats"))
}
