//! Contest API routes.
//!
//! Thin translation between JSON payloads and [`GradingService`] calls.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use sql_contest_api_types::{
    ErrorResponse, FinalizeRequest, FinalizeResponse, HealthCheckResponse, LeaderboardEntry,
    LeaderboardResponse, PreviewRequest, PreviewResponse, ProgressEntry, ProgressResponse,
    QuestionResponse, SubmitRequest, SubmitResponse,
};
use sql_contest_core::domain::{ContestantId, GradingError, QuestionId, Row, Scalar};
use std::sync::Arc;
use tracing::error;

use super::state::AppState;

type AppStateRef = State<Arc<AppState>>;

/// Creates the contest API router.
pub fn create_contest_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/questions", get(list_questions))
        // Grade and record one answer
        .route("/api/submissions", post(submit_query))
        // Run a query without grading it
        .route("/api/preview", post(preview_query))
        .route("/api/contestants/{contestant_id}/progress", get(get_progress))
        .route("/api/finalize", post(finalize_score))
        .route("/api/leaderboard", get(get_leaderboard))
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}

async fn list_questions(state: AppStateRef) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = state.grading.questions().await?;
    Ok(Json(
        questions
            .into_iter()
            .map(|question| QuestionResponse {
                id: question.id.value(),
                prompt: question.prompt,
            })
            .collect(),
    ))
}

async fn submit_query(
    state: AppStateRef,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let contestant_id = ContestantId::new(request.contestant_id).map_err(GradingError::from)?;
    let verdict = state
        .grading
        .submit(
            &contestant_id,
            QuestionId::new(request.question_id),
            &request.query,
        )
        .await?;

    Ok(Json(SubmitResponse {
        submission_id: verdict.submission_id.to_string(),
        accepted: true,
        correct: verdict.correct,
    }))
}

async fn preview_query(
    state: AppStateRef,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let rows = state.grading.preview(&request.query).await?;
    Ok(Json(PreviewResponse {
        rows: rows.rows().iter().map(row_to_json).collect(),
    }))
}

async fn get_progress(
    state: AppStateRef,
    Path(contestant_id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let contestant_id = ContestantId::new(contestant_id).map_err(GradingError::from)?;
    let submissions = state.grading.progress(&contestant_id).await?;

    Ok(Json(ProgressResponse {
        contestant_id: contestant_id.to_string(),
        answered: submissions
            .into_iter()
            .map(|submission| ProgressEntry {
                question_id: submission.question_id.value(),
                correct: submission.correct,
            })
            .collect(),
    }))
}

async fn finalize_score(
    state: AppStateRef,
    Json(request): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let contestant_id = ContestantId::new(request.contestant_id).map_err(GradingError::from)?;
    let score = state.grading.finalize(&contestant_id).await?;

    Ok(Json(FinalizeResponse {
        contestant_id: score.contestant_id.to_string(),
        total_score: score.total_score,
    }))
}

/// Leaderboard query parameters.
#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    /// Number of entries; the configured default when omitted.
    n: Option<u64>,
}

async fn get_leaderboard(
    state: AppStateRef,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let limit = query.n.unwrap_or(state.leaderboard_size);
    let scores = state.grading.leaderboard(limit).await?;

    Ok(Json(LeaderboardResponse {
        entries: scores
            .into_iter()
            .zip(1..)
            .map(|(score, rank)| LeaderboardEntry {
                rank,
                contestant_id: score.contestant_id.to_string(),
                total_score: score.total_score,
            })
            .collect(),
    }))
}

fn row_to_json(row: &Row) -> Map<String, Value> {
    row.columns()
        .map(|(column, value)| (column.to_string(), scalar_to_json(value)))
        .collect()
}

fn scalar_to_json(value: &Scalar) -> Value {
    match value {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Integer(i) => Value::Number((*i).into()),
        Scalar::Real(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Scalar::Text(s) => Value::String(s.clone()),
        Scalar::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// API error type.
#[derive(Debug)]
struct ApiError {
    message: String,
    code: &'static str,
    status: StatusCode,
}

impl From<GradingError> for ApiError {
    fn from(err: GradingError) -> Self {
        let (code, status) = match &err {
            GradingError::ForbiddenOperation { .. } => ("FORBIDDEN_OPERATION", StatusCode::BAD_REQUEST),
            GradingError::InvalidInput(_) => ("INVALID_INPUT", StatusCode::BAD_REQUEST),
            GradingError::Execution { .. } => ("EXECUTION_ERROR", StatusCode::UNPROCESSABLE_ENTITY),
            GradingError::ExecutionTimeout { .. } => {
                ("EXECUTION_TIMEOUT", StatusCode::REQUEST_TIMEOUT)
            }
            GradingError::DuplicateSubmission => ("DUPLICATE_SUBMISSION", StatusCode::CONFLICT),
            GradingError::AlreadyFinalized => ("ALREADY_FINALIZED", StatusCode::CONFLICT),
            GradingError::QuestionNotFound(_) => ("QUESTION_NOT_FOUND", StatusCode::NOT_FOUND),
            GradingError::Storage(_) => {
                error!(error = %err, "storage failure while serving request");
                ("STORAGE_UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE)
            }
        };

        ApiError {
            message: err.to_string(),
            code,
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_submission_maps_to_conflict() {
        let err = ApiError::from(GradingError::DuplicateSubmission);
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "DUPLICATE_SUBMISSION");
    }

    #[test]
    fn storage_failure_maps_to_service_unavailable() {
        let err = ApiError::from(GradingError::Storage("pool timed out".to_string()));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn non_finite_reals_serialize_as_null() {
        assert_eq!(scalar_to_json(&Scalar::Real(f64::NAN)), Value::Null);
        assert_eq!(scalar_to_json(&Scalar::Integer(7)), Value::from(7));
        assert_eq!(
            scalar_to_json(&Scalar::Blob(vec![0, 255])),
            Value::from(vec![0u8, 255])
        );
    }
}
