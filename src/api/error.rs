//! Handler-level failures and their HTTP shapes.

use crate::api::handlers::types::{ErrorResponse, MessageResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing payload")]
    MissingPayload,

    #[error("Email not found.")]
    EmailNotFound,

    /// Any delivery, store or cache failure; `error` carries the raw cause.
    #[error("{message} {error}")]
    Failed {
        message: &'static str,
        error: String,
    },
}

impl ApiError {
    pub fn failed(message: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Failed {
            message,
            error: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingPayload => {
                (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response()
            }
            Self::EmailNotFound => (
                StatusCode::NOT_FOUND,
                Json(MessageResponse::new("Email not found.")),
            )
                .into_response(),
            Self::Failed { message, error } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    message: message.to_string(),
                    error,
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::MissingPayload.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::EmailNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::failed("Signup failed.", "boom")
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn failed_keeps_the_raw_cause() {
        let err = ApiError::failed("Signup failed.", "connection refused");
        assert_eq!(err.to_string(), "Signup failed. connection refused");
    }
}
