// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription billing routes: checkout session creation and the Stripe
//! webhook that keeps subscription state in sync.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::billing::{
    normalize_subscription_status, CheckoutParams, StripeEvent, StripeSubscription,
};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::HeaderMap,
    routing::post,
    Extension, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Billing routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/subscribe/checkout", post(create_checkout))
}

/// Webhook routes (public; authenticated by signature instead of session).
pub fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/webhooks/stripe", post(stripe_webhook))
}

/// Checkout session response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutResponse {
    /// Hosted payment page to redirect the user to.
    pub url: Option<String>,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

/// POST /api/subscribe/checkout - start a Pro subscription checkout.
async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CheckoutResponse>> {
    let price_id = state
        .config
        .stripe_price_id
        .as_deref()
        .ok_or(AppError::BillingNotConfigured)?;

    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.has_active_subscription() {
        return Err(AppError::BadRequest("Already subscribed".to_string()));
    }

    let session = state
        .stripe
        .create_checkout_session(&CheckoutParams {
            price_id,
            customer_email: &user.email,
            client_reference_id: &user.id,
            success_url: &format!("{}/dashboard?subscribed=1", state.config.frontend_url),
            cancel_url: &format!("{}/dashboard?canceled=1", state.config.frontend_url),
        })
        .await?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "Created checkout session");

    Ok(Json(CheckoutResponse { url: session.url }))
}

/// POST /api/webhooks/stripe - Stripe event delivery.
///
/// Signature verification happens against the raw body bytes, before any
/// JSON parsing. Events we don't handle are acknowledged so Stripe stops
/// retrying them.
async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature".to_string()))?;

    if !state.stripe.verify_webhook_signature(&body, signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(AppError::BadRequest("Invalid signature".to_string()));
    }

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))?;

    match event.event_type.as_str() {
        "customer.subscription.created" | "customer.subscription.updated" => {
            let subscription: StripeSubscription = serde_json::from_value(event.data.object)
                .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))?;
            apply_subscription_change(&state, subscription).await?;
        }
        "customer.subscription.deleted" => {
            let subscription: StripeSubscription = serde_json::from_value(event.data.object)
                .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))?;
            apply_subscription_deletion(&state, subscription).await?;
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring webhook event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Record a created or updated subscription on the owning user.
///
/// The subscription event only carries the customer ID, so the email used
/// to find the user comes from a customer lookup. Events for customers we
/// can't match are acknowledged and logged rather than failed; Stripe
/// would otherwise retry them forever.
async fn apply_subscription_change(
    state: &AppState,
    subscription: StripeSubscription,
) -> Result<()> {
    let customer = state.stripe.get_customer(subscription.customer.id()).await?;

    if customer.deleted {
        tracing::warn!(customer_id = %customer.id, "Subscription event for deleted customer");
        return Ok(());
    }
    let Some(email) = customer.email else {
        tracing::warn!(customer_id = %customer.id, "Subscription event for customer without email");
        return Ok(());
    };

    let Some(mut user) = state.db.get_user_by_email(&email).await? else {
        tracing::warn!(customer_id = %customer.id, "No user matches webhook customer email");
        return Ok(());
    };

    let status = normalize_subscription_status(&subscription.status).to_string();
    user.stripe_customer_id = Some(customer.id);
    user.stripe_subscription_id = Some(subscription.id);
    user.subscription_status = Some(status.clone());
    user.updated_at = format_utc_rfc3339(Utc::now());
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, status = %status, "Updated subscription from webhook");
    Ok(())
}

/// Mark a user's subscription canceled when Stripe deletes it.
async fn apply_subscription_deletion(
    state: &AppState,
    subscription: StripeSubscription,
) -> Result<()> {
    let Some(mut user) = state.db.get_user_by_subscription(&subscription.id).await? else {
        tracing::warn!(subscription_id = %subscription.id, "No user matches deleted subscription");
        return Ok(());
    };

    user.subscription_status = Some("canceled".to_string());
    user.stripe_subscription_id = None;
    user.updated_at = format_utc_rfc3339(Utc::now());
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Subscription canceled from webhook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_response_serializes_url() {
        let json = serde_json::to_value(CheckoutResponse {
            url: Some("https://checkout.stripe.com/c/pay/cs_test_123".to_string()),
        })
        .unwrap();
        assert_eq!(
            json["url"],
            serde_json::json!("https://checkout.stripe.com/c/pay/cs_test_123")
        );
    }

    #[test]
    fn test_webhook_response_shape() {
        let json = serde_json::to_value(WebhookResponse { received: true }).unwrap();
        assert_eq!(json, serde_json::json!({"received": true}));
    }

    #[test]
    fn test_deleted_event_object_parses_without_customer_expansion() {
        // Deletion events arrive with the customer as a bare ID string.
        let sub: StripeSubscription = serde_json::from_value(serde_json::json!({
            "id": "sub_gone",
            "customer": "cus_1",
            "status": "canceled"
        }))
        .unwrap();
        assert_eq!(sub.id, "sub_gone");
        assert_eq!(sub.status, "canceled");
    }
}
