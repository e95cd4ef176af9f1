//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_credit::CreditError;
use domain_import::ImportError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, field: Option<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, field) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::InvalidState(msg) => (StatusCode::CONFLICT, "invalid_state", msg, None),
            ApiError::Validation { message, field } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message, field)
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CreditError> for ApiError {
    fn from(err: CreditError) -> Self {
        let field = err.field().map(str::to_string);
        match err {
            CreditError::PaymentRejected(_) | CreditError::Validation { .. } => {
                ApiError::validation(err.to_string(), field)
            }
            CreditError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CreditError::Conflict(msg) => ApiError::Conflict(msg),
            CreditError::InvalidState(msg) => ApiError::InvalidState(msg),
            CreditError::Persistence(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Credit(inner) => inner.into(),
            other => {
                let field = other.field().map(str::to_string);
                ApiError::validation(other.to_string(), field)
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .min()
            .map(|name| name.to_string());
        ApiError::validation(errors.to_string(), field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_credit::PaymentValidationError;
    use rust_decimal::Decimal;

    #[test]
    fn test_payment_rejection_keeps_field() {
        let err: ApiError = CreditError::from(PaymentValidationError::InvalidAmount {
            amount: Decimal::ZERO,
        })
        .into();
        assert!(matches!(err, ApiError::Validation { field: Some(ref f), .. } if f == "amount"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::from(CreditError::not_found("Credit", "CRD-1")), StatusCode::NOT_FOUND),
            (ApiError::from(CreditError::Conflict("stale".to_string())), StatusCode::CONFLICT),
            (ApiError::from(CreditError::invalid_state("not Lunas")), StatusCode::CONFLICT),
            (ApiError::validation("bad", None), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
