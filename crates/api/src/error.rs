use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::purchase::InvalidPackSize;
use domain::services::PinRuleError;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::payments::PaymentError;
use crate::services::pins::PinError;
use crate::services::settlement::SettlementError;
use crate::services::webhook::WebhookError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient funds: {message}")]
    InsufficientFunds {
        message: String,
        required: i32,
        available: i32,
    },

    #[error("Duration limit exceeded: {message}")]
    DurationLimitExceeded {
        message: String,
        current: i32,
        requested: i32,
        max: i32,
    },

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Invalid payment request: {0}")]
    PaymentInvalidRequest(String),

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, error_code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthenticated", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            ApiError::InsufficientFunds {
                message,
                required,
                available,
            } => {
                details = Some(json!({ "required": required, "available": available }));
                (StatusCode::BAD_REQUEST, "insufficient_funds", message)
            }
            ApiError::DurationLimitExceeded {
                message,
                current,
                requested,
                max,
            } => {
                details = Some(json!({
                    "currentDays": current,
                    "requestedDays": requested,
                    "maxDays": max,
                }));
                (StatusCode::BAD_REQUEST, "duration_limit_exceeded", message)
            }
            ApiError::PaymentDeclined(msg) => (StatusCode::BAD_REQUEST, "payment_declined", msg),
            ApiError::PaymentInvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "payment_invalid_request", msg)
            }
            ApiError::PaymentProvider(msg) => {
                tracing::error!("Payment provider error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "payment_provider_error",
                    "The payment provider could not process the request".into(),
                )
            }
            ApiError::InvalidSignature(msg) => (StatusCode::BAD_REQUEST, "invalid_signature", msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation(message)
    }
}

impl From<PinRuleError> for ApiError {
    fn from(err: PinRuleError) -> Self {
        let message = err.to_string();
        match err {
            PinRuleError::InvalidDuration(_) => ApiError::Validation(message),
            PinRuleError::InsufficientFunds {
                required,
                available,
                ..
            } => ApiError::InsufficientFunds {
                message,
                required,
                available,
            },
            PinRuleError::DurationLimitExceeded {
                current,
                requested,
                max,
            } => ApiError::DurationLimitExceeded {
                message,
                current,
                requested,
                max,
            },
        }
    }
}

impl From<PinError> for ApiError {
    fn from(err: PinError) -> Self {
        match err {
            PinError::Rule(rule) => rule.into(),
            PinError::BoardNotFound | PinError::PostNotFound | PinError::NoActivePin => {
                ApiError::NotFound(err.to_string())
            }
            PinError::NotAuthor | PinError::NotBoardOwner => {
                ApiError::Forbidden(err.to_string())
            }
            PinError::UserNotFound => ApiError::Unauthorized("User no longer exists".into()),
            PinError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Declined(msg) => ApiError::PaymentDeclined(msg),
            PaymentError::InvalidRequest(msg) => ApiError::PaymentInvalidRequest(msg),
            PaymentError::Provider(msg) => ApiError::PaymentProvider(msg),
        }
    }
}

impl From<InvalidPackSize> for ApiError {
    fn from(err: InvalidPackSize) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::InvalidPack(_) | SettlementError::Metadata(_) => {
                ApiError::Validation(err.to_string())
            }
            SettlementError::UserNotFound(_) => ApiError::NotFound("User not found".into()),
            SettlementError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => {
                ApiError::Conflict("Email already registered".to_string())
            }
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::DatabaseError(db_err) => db_err.into(),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::NotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            _ => ApiError::InvalidSignature(err.to_string()),
        }
    }
}
