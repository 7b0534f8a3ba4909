//! HTTP-facing error type.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::{MatchError, StoreError};
use crate::metrics::{self, Operation};

/// Errors returned by the API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not a well-formed payload for the endpoint.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A profile with this id is already enrolled.
    #[error("user {0} is already registered")]
    DuplicateUser(String),

    /// No profile with this id exists.
    #[error("user {0} not found")]
    UserNotFound(String),

    /// Submitted landmarks are too far from the enrolled ones.
    #[error("authentication failed for user {0}")]
    AuthenticationFailed(String),

    /// Submitted landmarks cannot be compared with the enrolled ones.
    #[error(transparent)]
    DimensionMismatch(#[from] MatchError),

    /// The profile store failed while serving `operation`.
    #[error("{operation} failed: {source}")]
    Storage {
        /// Operation being served.
        operation: Operation,
        /// Store failure.
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wrap a store failure for `operation`.
    pub fn storage(operation: Operation, source: StoreError) -> Self {
        ApiError::Storage { operation, source }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateUser(_) | ApiError::DimensionMismatch(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Body of a 4xx response, and of successful mutations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Create a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a 5xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Generic failure description.
    pub error: &'static str,
}

fn storage_failure_text(operation: Operation) -> &'static str {
    match operation {
        Operation::Register => "failed to register face data",
        Operation::List => "failed to fetch face data",
        Operation::Update => "failed to update face data",
        Operation::Authenticate => "error during face authentication",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::Storage { operation, source } => {
                error!(%operation, kind = source.kind(), error = %source, "Profile store failure");
                metrics::inc_store_errors(source.kind());
                let body = ErrorResponse {
                    error: storage_failure_text(operation),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Validation(detail) => {
                warn!(%detail, "Rejected malformed request");
                (status, Json(MessageResponse::new(format!("invalid request: {detail}"))))
                    .into_response()
            }
            ApiError::DuplicateUser(_) => {
                (status, Json(MessageResponse::new("user already registered"))).into_response()
            }
            ApiError::UserNotFound(_) => {
                (status, Json(MessageResponse::new("user not found"))).into_response()
            }
            ApiError::AuthenticationFailed(_) => {
                (status, Json(MessageResponse::new("authentication failed"))).into_response()
            }
            ApiError::DimensionMismatch(err) => {
                (status, Json(MessageResponse::new(err.to_string()))).into_response()
            }
        }
    }
}
