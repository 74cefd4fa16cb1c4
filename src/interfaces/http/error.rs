//! HTTP error mapping
//!
//! Every failure leaves the API as `{"error": "<message>"}`. Internal
//! failures carry a fixed message; the underlying cause is only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::common::ErrorBody;
use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthenticated,

    /// Missing and foreign resources both end up here
    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: DomainError,
    },
}

impl ApiError {
    /// Map a domain error, using `internal_message` for anything the caller
    /// cannot fix.
    pub fn from_domain(err: DomainError, internal_message: &'static str) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::Forbidden(_) | DomainError::NotFound { .. } => Self::Forbidden,
            DomainError::Unauthorized(_) => Self::Unauthenticated,
            cause @ (DomainError::Conflict(_) | DomainError::Storage(_)) => Self::Internal {
                message: internal_message,
                cause,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal { message, cause } => {
                tracing::error!(error = %cause, "{}", message);
            }
            Self::Forbidden | Self::Unauthenticated => {
                tracing::info!("Authorization error: {}", self);
            }
            Self::BadRequest(msg) => {
                tracing::debug!("Client error: {}", msg);
            }
        }

        let status = self.status_code();
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
