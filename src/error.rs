use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::response::NotificationResponse;

/// Errors surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(NotificationResponse::rejected(message)),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                // Details stay in the log; callers get a generic message.
                error!(error = %detail, "Unhandled error while processing request");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(NotificationResponse::failed(
                        "Internal server error".to_string(),
                    )),
                )
                    .into_response()
            }
        }
    }
}
