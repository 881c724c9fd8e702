use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domains::intake::{FieldError, IntakeError};
use crate::server::app::AxumAppState;

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            IntakeError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid request".to_string(),
                    details: Some(details),
                },
            ),
            e @ IntakeError::Policy { .. } => {
                (StatusCode::FORBIDDEN, ErrorResponse::new(e.to_string()))
            }
            e @ IntakeError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, ErrorResponse::new(e.to_string()))
            }
            IntakeError::Internal(e) => {
                tracing::error!(error = %e, "Failed to admit analysis request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// `POST /scrape` - validate, rate limit and queue `{url, email}`.
///
/// Returns 202 once the request is on the queue; the analysis itself
/// happens later and its result arrives by email.
pub async fn scrape_handler(Extension(state): Extension<AxumAppState>, body: Bytes) -> Response {
    match state.intake.admit(&body).await {
        Ok(_) => (StatusCode::ACCEPTED, Json(QueuedResponse { queued: true })).into_response(),
        Err(e) => e.into_response(),
    }
}
