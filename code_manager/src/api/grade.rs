use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marker::error::MarkerError;
use marker::types::{
    AttemptGradeOutcome, AttemptSnapshot, GradeOptions, LearnerAnswer, Question,
    QuestionGradeOutcome,
};
use marker::{GradingState, spawn_grading_job};
use serde::Deserialize;

use crate::api::response::{ApiResponse, error_response};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GradeQuestionRequest {
    pub question: Question,
    #[serde(default)]
    pub answer: LearnerAnswer,
}

#[derive(Debug, Deserialize)]
pub struct GradeAttemptRequest {
    pub attempt: AttemptSnapshot,
    #[serde(default)]
    pub partial: bool,
}

fn marker_error_response(err: MarkerError) -> Response {
    let status = match err {
        MarkerError::Validation(_) => StatusCode::BAD_REQUEST,
        MarkerError::Execution(_) | MarkerError::Store(_) | MarkerError::JobAborted(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Grading failed");
    }
    error_response(status, err.to_string())
}

/// Hidden test-case details never leave the service.
fn learner_state(state: GradingState) -> GradingState {
    match state {
        GradingState::Completed { outcome, graded_at } => GradingState::Completed {
            outcome: outcome.learner_view(),
            graded_at,
        },
        other => other,
    }
}

/// POST /grade/question
///
/// Grades one question synchronously.
///
/// ### Request Body
/// ```json
/// {
///   "question": { "id": "q1", "points": 2, "type": "single_choice", "correct_answer": "c" },
///   "answer": { "selected": ["c"] }
/// }
/// ```
pub async fn grade_question(
    State(state): State<AppState>,
    Json(req): Json<GradeQuestionRequest>,
) -> Response {
    match state.grader.grade_question(&req.question, &req.answer).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::<QuestionGradeOutcome>::success(
                outcome.learner_view(),
                "Question graded",
            )),
        )
            .into_response(),
        Err(err) => marker_error_response(err),
    }
}

/// POST /grade/attempt
///
/// Grades every question of an attempt synchronously. With `"partial": true`
/// manually graded questions are left pending.
pub async fn grade_attempt(
    State(state): State<AppState>,
    Json(req): Json<GradeAttemptRequest>,
) -> Response {
    let options = GradeOptions {
        partial: req.partial,
    };
    match state.grader.grade_attempt(&req.attempt, options).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::<AttemptGradeOutcome>::success(
                outcome.learner_view(),
                "Attempt graded",
            )),
        )
            .into_response(),
        Err(err) => marker_error_response(err),
    }
}

/// POST /grade/attempt/submit
///
/// Queues background grading and returns `202 Accepted` with the pending
/// state. Poll `GET /grade/attempt/{attempt_id}` for the result.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Json(req): Json<GradeAttemptRequest>,
) -> Response {
    if req.attempt.attempt_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Attempt id is required");
    }

    let options = GradeOptions {
        partial: req.partial,
    };
    match spawn_grading_job(
        state.grader.clone(),
        state.grades.clone(),
        req.attempt,
        options,
    )
    .await
    {
        Ok(handle) => (
            StatusCode::ACCEPTED,
            Json(ApiResponse::<GradingState>::success(
                handle.state(),
                format!("Grading queued for attempt {}", handle.attempt_id()),
            )),
        )
            .into_response(),
        Err(err) => marker_error_response(err),
    }
}

/// GET /grade/attempt/{attempt_id}
///
/// - `200 OK` with the pending, completed or failed state.
/// - `404 Not Found` if no grading was ever queued for the attempt.
pub async fn attempt_status(
    State(state): State<AppState>,
    Path(attempt_id): Path<String>,
) -> Response {
    match state.grades.load(&attempt_id).await {
        Ok(Some(grading)) => (
            StatusCode::OK,
            Json(ApiResponse::success(learner_state(grading), "Grading state")),
        )
            .into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("No grading found for attempt {attempt_id}"),
        ),
        Err(err) => marker_error_response(err),
    }
}
