// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Json, State},
    routing::get,
    Extension, Router,
};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_profile))
        .route("/api/users/profile", get(get_profile).patch(update_profile))
}

/// User payload returned by session and profile endpoints.
///
/// Never includes the password hash or Stripe identifiers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub weight_unit: String,
    pub subscription_status: Option<String>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            age: user.age,
            weight: user.weight,
            height: user.height,
            weight_unit: user.weight_unit.clone(),
            subscription_status: user.subscription_status.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// `{user}` envelope for profile responses.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

/// Profile update. Absent fields are unchanged; explicit `null` clears
/// the optional numeric fields.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(min = 1, max = 150))]
    pub age: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(min = 0.0, max = 500.0))]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(min = 0.0, max = 300.0))]
    pub height: Option<Option<f64>>,
    #[validate(custom(function = validate_weight_unit))]
    pub weight_unit: Option<String>,
}

/// Wrap any present value in the outer `Some`, so an explicit JSON `null`
/// (`Some(None)`, clear the field) stays distinct from an absent field
/// (`None`, leave it unchanged).
fn double_option<'de, T, D>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

fn validate_weight_unit(unit: &str) -> std::result::Result<(), validator::ValidationError> {
    if unit == "kg" || unit == "lb" {
        return Ok(());
    }
    let mut error = validator::ValidationError::new("weight_unit");
    error.message = Some("Weight unit must be kg or lb".into());
    Err(error)
}

/// GET /api/auth/me and GET /api/users/profile - the current user.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let user = load_user(&state, &auth.user_id).await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::from_user(&user),
    }))
}

/// PATCH /api/users/profile - update the supplied fields only.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    payload.validate().map_err(AppError::Validation)?;

    let mut user = load_user(&state, &auth.user_id).await?;

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(age) = payload.age {
        user.age = age;
    }
    if let Some(weight) = payload.weight {
        user.weight = weight;
    }
    if let Some(height) = payload.height {
        user.height = height;
    }
    if let Some(weight_unit) = payload.weight_unit {
        user.weight_unit = weight_unit;
    }
    user.updated_at = format_utc_rfc3339(Utc::now());

    state.db.upsert_user(&user).await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::from_user(&user),
    }))
}

async fn load_user(state: &AppState, user_id: &str) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
