// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error-to-response mapping tests.
//!
//! Every `AppError` variant must map to the documented status code and
//! `{error, details}` body, and server-side failures must not leak their
//! internal messages to the client.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use fittrack_api::error::AppError;
use serde_json::Value;
use validator::Validate;

async fn render(error: AppError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_auth_errors_map_to_401() {
    let (status, json) = render(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
    assert!(json.get("details").is_none());

    let (status, json) = render(AppError::InvalidToken).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "invalid_token");

    let (status, json) = render(AppError::InvalidCredentials).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "invalid_credentials");
    assert_eq!(json["details"], "Invalid email or password");
}

#[tokio::test]
async fn test_payment_required_maps_to_402() {
    let (status, json) = render(AppError::PaymentRequired).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json["error"], "payment_required");
    assert_eq!(
        json["details"],
        "This feature requires an active subscription"
    );
}

#[tokio::test]
async fn test_not_found_carries_message() {
    let (status, json) = render(AppError::NotFound("Workout not found".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["details"], "Workout not found");
}

#[tokio::test]
async fn test_bad_request_carries_message() {
    let (status, json) = render(AppError::BadRequest("exerciseId is required".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");
    assert_eq!(json["details"], "exerciseId is required");
}

#[tokio::test]
async fn test_validation_errors_flatten_to_field_map() {
    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
        password: &'static str,
    }

    let errors = Probe { password: "short" }.validate().unwrap_err();
    let (status, json) = render(AppError::Validation(errors)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(
        json["details"]["password"][0],
        "Password must be at least 8 characters"
    );
}

#[tokio::test]
async fn test_field_validation_helper_shape() {
    let (status, json) =
        render(AppError::field_validation("email", "Email already registered")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["details"]["email"][0], "Email already registered");
}

#[tokio::test]
async fn test_server_errors_hide_internals() {
    let (status, json) = render(AppError::Database("connection refused at 10.0.0.1".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());

    let (status, json) = render(AppError::Internal(anyhow::anyhow!("stack details"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
    assert!(json.get("details").is_none());

    let (status, json) = render(AppError::BillingNotConfigured).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "billing_not_configured");
}

#[tokio::test]
async fn test_stripe_errors_map_to_bad_gateway() {
    let (status, json) = render(AppError::StripeApi("Stripe returned 500".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "stripe_error");
    assert_eq!(json["details"], "Stripe returned 500");
}
