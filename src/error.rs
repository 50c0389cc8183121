// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Subscription required")]
    PaymentRequired,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(validator::ValidationErrors),

    #[error("Billing is not configured")]
    BillingNotConfigured,

    #[error("Stripe API error: {0}")]
    StripeApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Single-field validation failure, for checks that run after schema
    /// validation (uniqueness, referential integrity).
    pub fn field_validation(field: &'static str, message: &'static str) -> Self {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("invalid");
        error.message = Some(message.into());
        errors.add(field.into(), error);
        AppError::Validation(errors)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Flatten validator output into a `field -> [messages]` map for form UIs.
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut fields = serde_json::Map::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .map(Value::String)
            .collect();
        fields.insert(field.to_string(), Value::Array(messages));
    }
    Value::Object(fields)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                Some(Value::String("Invalid email or password".to_string())),
            ),
            AppError::PaymentRequired => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_required",
                Some(Value::String(
                    "This feature requires an active subscription".to_string(),
                )),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found",
                Some(Value::String(msg.clone())),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                Some(Value::String(msg.clone())),
            ),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(validation_details(errors)),
            ),
            AppError::BillingNotConfigured => {
                tracing::error!("Checkout requested but STRIPE_PRICE_ID is not set");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "billing_not_configured",
                    None,
                )
            }
            AppError::StripeApi(msg) => (
                StatusCode::BAD_GATEWAY,
                "stripe_error",
                Some(Value::String(msg.clone())),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
