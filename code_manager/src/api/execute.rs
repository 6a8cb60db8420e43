use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use code_runner::ScoreSummary;
use code_runner::error::RunnerError;
use code_runner::types::{SyntaxCheck, TestCase, TestCaseResult};
use serde::{Deserialize, Serialize};
use util::execution_config::ExecutionLimits;
use util::languages::Language;
use validator::Validate;

use crate::api::response::{ApiResponse, error_response};
use crate::quota::{QuotaError, QuotaKey, QuotaUsage};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub code: String,

    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,

    #[serde(default)]
    pub test_cases: Vec<TestCase>,

    #[validate(range(min = 1, message = "Time limit must be a positive number of milliseconds"))]
    pub time_limit_ms: Option<u64>,

    #[validate(range(min = 1, message = "Memory limit must be a positive number of megabytes"))]
    pub memory_limit_mb: Option<u64>,

    /// Required together with `question_id` when any test case is hidden.
    pub learner_id: Option<String>,
    pub question_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub results: Vec<TestCaseResult>,
    pub summary: ScoreSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaUsage>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateRequest {
    pub code: String,

    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,
}

pub(crate) fn runner_error_response(err: RunnerError) -> Response {
    let status = match err {
        RunnerError::UnsupportedLanguage(_) | RunnerError::Validation(_) => StatusCode::BAD_REQUEST,
        RunnerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Execution failed");
    }
    error_response(status, err.to_string())
}

fn quota_error_response(err: QuotaError) -> Response {
    let status = match err {
        QuotaError::Exhausted { .. } => StatusCode::TOO_MANY_REQUESTS,
        QuotaError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

/// POST /execute
///
/// Runs `code` against `testCases` and returns one result per case, in order.
///
/// ### Request Body
/// ```json
/// {
///   "code": "print(input())",
///   "language": "python",
///   "testCases": [{ "id": "t1", "input": "hi", "expectedOutput": "hi" }],
///   "timeLimitMs": 1000
/// }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ results, summary }`; hidden cases only reveal pass/fail.
/// - `400 Bad Request` for validation failures or an unsupported language.
/// - `429 Too Many Requests` once the hidden-run limit for the question is used up.
/// - `500 Internal Server Error` if the sandbox itself is unusable.
pub async fn execute(State(state): State<AppState>, Json(req): Json<ExecuteRequest>) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = common::format_validation_errors(&validation_errors);
        return error_response(StatusCode::BAD_REQUEST, error_message);
    }

    if let Err(err) = req.language.parse::<Language>() {
        return runner_error_response(err.into());
    }

    let defaults = state.service.config().execution;
    let limits = ExecutionLimits::new(
        req.time_limit_ms.unwrap_or(defaults.time_limit_ms),
        req.memory_limit_mb.unwrap_or(defaults.memory_limit_mb),
    );

    // A rejected request must not use up a hidden run.
    if let Err(err) = code_runner::validate_request(&req.test_cases, limits) {
        return runner_error_response(err);
    }

    let quota = if req.test_cases.iter().any(|tc| tc.is_hidden) {
        let (Some(learner_id), Some(question_id)) = (&req.learner_id, &req.question_id) else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "learnerId and questionId are required when running hidden test cases",
            );
        };
        match state
            .quota
            .consume(&QuotaKey::new(learner_id.as_str(), question_id.as_str()))
            .await
        {
            Ok(usage) => Some(usage),
            Err(err) => return quota_error_response(err),
        }
    } else {
        None
    };

    let outcome = state
        .manager
        .run(
            state
                .service
                .execute_code(&req.code, &req.language, &req.test_cases, limits),
        )
        .await;

    match outcome {
        Ok(results) => {
            let summary = ScoreSummary::from_results(&results);
            let message = format!(
                "{} of {} test cases passed",
                summary.passed_tests, summary.total_tests
            );
            let results = results.iter().map(TestCaseResult::learner_view).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    ExecuteResponse {
                        results,
                        summary,
                        quota,
                    },
                    message,
                )),
            )
                .into_response()
        }
        Err(err) => runner_error_response(err),
    }
}

/// POST /validate
///
/// Parse-only check; the code is never executed.
///
/// - `200 OK` with `{ "valid": false, "error": "SyntaxError: ..." }` for invalid code.
/// - `400 Bad Request` for an unsupported language.
pub async fn validate(State(state): State<AppState>, Json(req): Json<ValidateRequest>) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = common::format_validation_errors(&validation_errors);
        return error_response(StatusCode::BAD_REQUEST, error_message);
    }

    match state
        .manager
        .run(state.service.validate_syntax(&req.code, &req.language))
        .await
    {
        Ok(check) => {
            let message = if check.valid {
                "Syntax is valid"
            } else {
                "Syntax error"
            };
            (
                StatusCode::OK,
                Json(ApiResponse::<SyntaxCheck>::success(check, message)),
            )
                .into_response()
        }
        Err(err) => runner_error_response(err),
    }
}
