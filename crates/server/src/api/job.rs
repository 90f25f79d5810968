//! Job API handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use oabrief_core::{Credentials, ErrorKind, JobError, JobSnapshot, JobStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a job
#[derive(Debug, Deserialize)]
pub struct StartJobBody {
    pub username: String,
    pub password: String,
}

/// Request body for submitting a passcode
#[derive(Debug, Deserialize)]
pub struct SubmitOtpBody {
    pub otp: String,
}

/// Current job status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub message: String,
    pub last_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ErrorKind>,
}

impl From<JobSnapshot> for StatusResponse {
    fn from(snapshot: JobSnapshot) -> Self {
        Self {
            status: snapshot.status,
            message: snapshot.message,
            last_update: snapshot.last_update.to_rfc3339(),
            failure: snapshot.failure,
        }
    }
}

/// Finished digest
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub markdown: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

pub type ApiError = (StatusCode, Json<JobErrorResponse>);

fn error_response(err: JobError) -> ApiError {
    let status = match &err {
        JobError::Validation(_) => StatusCode::BAD_REQUEST,
        JobError::Conflict => StatusCode::CONFLICT,
        JobError::OtpNotExpected { .. } => StatusCode::BAD_REQUEST,
        JobError::NotReady { .. } => StatusCode::NOT_FOUND,
        JobError::OtpTimeout(_) | JobError::Stage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(JobErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        }),
    )
}

fn rejection_response(rejection: JsonRejection) -> ApiError {
    error_response(JobError::Validation(rejection.body_text()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Start the job
pub async fn start_job(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StartJobBody>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(body) = body.map_err(rejection_response)?;
    let credentials = Credentials::new(body.username, body.password).map_err(error_response)?;

    state
        .orchestrator()
        .start(credentials)
        .map(|snapshot| Json(snapshot.into()))
        .map_err(error_response)
}

/// Get the current job status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(state.orchestrator().status().into())
}

/// Submit the one-time passcode the job is waiting for
pub async fn submit_otp(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SubmitOtpBody>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(body) = body.map_err(rejection_response)?;

    state
        .orchestrator()
        .submit_otp(&body.otp)
        .map(|snapshot| Json(snapshot.into()))
        .map_err(error_response)
}

/// Get the digest of a finished job
pub async fn get_result(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResultResponse>, ApiError> {
    state
        .orchestrator()
        .result()
        .map(|markdown| Json(ResultResponse { markdown }))
        .map_err(error_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oabrief_core::StageError;
    use std::time::Duration;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (JobError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
            (JobError::Conflict, StatusCode::CONFLICT),
            (
                JobError::OtpNotExpected {
                    status: JobStatus::Idle,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                JobError::NotReady {
                    status: JobStatus::Processing,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                JobError::OtpTimeout(Duration::from_secs(60)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                JobError::Stage(StageError::NoRecords),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, _) = error_response(err);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_error_body_carries_kind() {
        let (_, Json(body)) = error_response(JobError::Conflict);
        assert_eq!(body.kind, ErrorKind::Conflict);
        assert_eq!(body.error, "a job is already running");
    }
}
