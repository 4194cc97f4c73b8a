//! API error taxonomy.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
//! each variant to its HTTP status and a `{code, error, message}` body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Numeric error codes carried in the response body.
pub mod error_codes {
    // Client errors (1xxx)
    pub const VALIDATION_FAILED: i32 = 1001;
    pub const CONFLICT: i32 = 1002;

    // Auth errors (2xxx)
    pub const UNAUTHORIZED: i32 = 2001;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4004;

    // Server errors (5xxx)
    pub const STORE_ERROR: i32 = 5000;
    pub const INTERNAL_ERROR: i32 = 5001;
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request field
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Bad credentials, or missing/invalid bearer token
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Backing store failure. Only `context` reaches the client.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// For use with `map_err`: wraps a store error with the operation it interrupted.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { context, source }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Validation(_) => error_codes::VALIDATION_FAILED,
            Self::Conflict(_) => error_codes::CONFLICT,
            Self::Unauthorized(_) => error_codes::UNAUTHORIZED,
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::Store { .. } => error_codes::STORE_ERROR,
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Store { .. } => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            // Duplicate email is reported as a plain 400, as existing clients expect
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client. Store failures are reduced to their context.
    pub fn client_message(&self) -> String {
        match self {
            Self::Store { context, .. } => (*context).to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(source: StoreError) -> Self {
        Self::Store {
            context: "Error accessing DB",
            source,
        }
    }
}

// Malformed bodies and query strings surface as 400 validation errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// JSON response body for errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = 1002)]
    pub code: i32,
    #[schema(example = "CONFLICT")]
    pub error: String,
    #[schema(example = "The email already exists")]
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store { context, source } => {
                tracing::error!(error = %source, "{}", context);
            }
            Self::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        let body = ErrorResponse {
            code: self.code(),
            error: self.name().to_string(),
            message: self.client_message(),
        };
        (self.http_status(), Json(body)).into_response()
    }
}
