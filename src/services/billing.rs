// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe API client for subscription billing.
//!
//! Handles:
//! - Checkout session creation for Pro upgrades
//! - Customer lookups during webhook processing
//! - Webhook signature verification (HMAC-SHA256 with replay protection)

use crate::error::AppError;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a webhook signature timestamp (5 minutes).
const SIGNATURE_TOLERANCE_SECS: i64 = 5 * 60;

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    /// Create a new Stripe client with API credentials.
    pub fn new(secret_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.stripe.com/v1".to_string(),
            secret_key,
            webhook_secret,
        }
    }

    /// Create a subscription checkout session.
    ///
    /// Stripe's v1 API takes form-encoded bodies with bracketed array
    /// syntax for nested fields.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutParams<'_>,
    ) -> Result<CheckoutSession, AppError> {
        let url = format!("{}/checkout/sessions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&[
                ("mode", "subscription"),
                ("line_items[0][price]", params.price_id),
                ("line_items[0][quantity]", "1"),
                ("customer_email", params.customer_email),
                ("client_reference_id", params.client_reference_id),
                ("success_url", params.success_url),
                ("cancel_url", params.cancel_url),
            ])
            .send()
            .await
            .map_err(|e| AppError::StripeApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Get a customer by ID.
    pub async fn get_customer(&self, customer_id: &str) -> Result<StripeCustomer, AppError> {
        let url = format!("{}/customers/{}", self.base_url, customer_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::StripeApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Verify a `Stripe-Signature` header against the raw request body.
    pub fn verify_webhook_signature(&self, payload: &[u8], signature_header: &str) -> bool {
        verify_signature(
            &self.webhook_secret,
            payload,
            signature_header,
            Utc::now().timestamp(),
        )
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Stripe API request failed");
            return Err(AppError::StripeApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StripeApi(format!("JSON parse error: {}", e)))
    }
}

/// Map a Stripe subscription status to the value stored on the user.
///
/// Both `active` and `trialing` grant Pro access, so they collapse to
/// `"active"`. Everything else (`past_due`, `canceled`, ...) is stored
/// verbatim and does not grant access.
pub fn normalize_subscription_status(status: &str) -> &str {
    match status {
        "active" | "trialing" => "active",
        other => other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhook signature verification
// ─────────────────────────────────────────────────────────────────────────────

/// Verify a Stripe webhook signature header.
///
/// The header format is `t=<unix_ts>,v1=<hex>[,v1=<hex>...]`; multiple v1
/// entries appear during signing-secret rollover. The signed payload is
/// `"{timestamp}.{body}"`.
fn verify_signature(secret: &str, payload: &[u8], header: &str, now: i64) -> bool {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        if let Some(t) = part.trim().strip_prefix("t=") {
            timestamp = t.parse().ok();
        } else if let Some(sig) = part.trim().strip_prefix("v1=") {
            candidates.push(sig);
        }
    }

    let Some(timestamp) = timestamp else {
        return false;
    };
    if candidates.is_empty() {
        return false;
    }

    // Replay protection: reject signatures outside the tolerance window
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        tracing::warn!(timestamp, "Rejected webhook with stale signature timestamp");
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    candidates.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| bool::from(bytes.as_slice().ct_eq(expected.as_slice())))
            .unwrap_or(false)
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Stripe API types (only the fields we use)
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for creating a subscription checkout session.
pub struct CheckoutParams<'a> {
    pub price_id: &'a str,
    pub customer_email: &'a str,
    pub client_reference_id: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

/// Checkout session response.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page URL the frontend redirects to.
    pub url: Option<String>,
}

/// Customer object from the Stripe API.
///
/// Deleted customers come back as a stub with `deleted: true` and most
/// fields absent.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// Webhook event envelope.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

/// Event payload wrapper; `object` is decoded per event type.
#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// Subscription object from `customer.subscription.*` events.
#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: CustomerRef,
    pub status: String,
}

/// Stripe sends the customer either as a bare ID string or an expanded object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Id(String),
    Object { id: String },
}

impl CustomerRef {
    pub fn id(&self) -> &str {
        match self {
            CustomerRef::Id(id) => id,
            CustomerRef::Object { id } => id,
        }
    }
}
