//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
///
/// Field names are stored in camelCase, matching the API casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID (also used as document ID)
    pub id: String,
    /// Email address, unique by lookup, used for login
    pub email: String,
    /// Display name
    pub name: String,
    /// Bcrypt hash of the password
    pub password_hash: String,
    /// Age in years
    pub age: Option<u32>,
    /// Body weight, in `weight_unit`
    pub weight: Option<f64>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Preferred weight unit ("kg" or "lb")
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    /// Stripe customer ID, set once checkout has completed
    pub stripe_customer_id: Option<String>,
    /// Stripe subscription ID while a subscription exists
    pub stripe_subscription_id: Option<String>,
    /// Subscription status as reported by Stripe webhooks
    pub subscription_status: Option<String>,
    /// When the account was created (ISO 8601)
    pub created_at: String,
    /// Last profile update (ISO 8601)
    pub updated_at: String,
}

fn default_weight_unit() -> String {
    "kg".to_string()
}

impl User {
    /// Whether the user currently has Pro access.
    ///
    /// The webhook handler stores Stripe's `active` and `trialing` both as
    /// "active"; anything else (or no subscription at all) is the free tier.
    pub fn has_active_subscription(&self) -> bool {
        self.subscription_status.as_deref() == Some("active")
    }
}
