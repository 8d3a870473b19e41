//! Application-level error type and HTTP mapping.
//!
//! Service and repository errors converge here before leaving the process.
//! Internal failures are captured to Sentry and redacted in the response
//! body; client errors pass their message through.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::orders::OrderError;

/// All errors an HTTP handler can surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or incomplete request payload.
    #[error("{0}")]
    Payload(String),

    /// Payment method not accepted by the endpoint.
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    /// Payment provider declined to confirm the payment.
    #[error("payment could not be confirmed")]
    PaymentNotConfirmed,

    /// Payment provider unreachable or unconfigured.
    #[error("payment provider unavailable")]
    ProviderUnavailable,

    /// The requested resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request conflicts with existing state.
    #[error("{0}")]
    Conflict(String),

    /// No usable identity on the request.
    #[error("authentication required")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("access denied")]
    Forbidden,

    /// Login failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Database failure. The inner message never reaches the client.
    #[error("database error")]
    Database(#[source] RepositoryError),

    /// Any other internal failure. The inner message never reaches the client.
    #[error("internal server error")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Payload(_) | Self::UnsupportedPaymentMethod(_) | Self::PaymentNotConfirmed => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ProviderUnavailable | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable | Self::Database(_) | Self::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = ?self, "request failed");
            sentry::capture_error(&self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("resource"),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidPayload(msg) => Self::Payload(msg),
            OrderError::UnsupportedPaymentMethod(tag) => Self::UnsupportedPaymentMethod(tag),
            OrderError::ProviderUnavailable => Self::ProviderUnavailable,
            OrderError::PaymentNotConfirmed => Self::PaymentNotConfirmed,
            OrderError::InvalidStatus(msg) => Self::Payload(format!("invalid status: {msg}")),
            OrderError::InvalidTransition { from, to } => {
                Self::Payload(format!("cannot move order from {from} to {to}"))
            }
            OrderError::NotFound => Self::NotFound("order"),
            OrderError::Repository(e) => e.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPhone(e) => Self::Payload(format!("invalid phone number: {e}")),
            AuthError::PasswordTooShort => Self::Payload(err.to_string()),
            AuthError::UserAlreadyExists => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Hashing => Self::Internal("password hashing failed".to_owned()),
            AuthError::Repository(e) => e.into(),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidAmount(_) => Self::Payload(err.to_string()),
            CheckoutError::Http(_) | CheckoutError::Api { .. } => {
                tracing::error!(error = %err, "checkout session creation failed");
                Self::ProviderUnavailable
            }
        }
    }
}
