// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: register, login, logout.
//!
//! Sessions are JWTs delivered in an HttpOnly cookie, so the browser
//! never handles the token directly. The same JWT is also accepted as a
//! Bearer header for non-browser clients.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::User;
use crate::routes::users::UserResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Session lifetime; the JWT expiry in `create_jwt` matches.
const SESSION_DAYS: i64 = 7;

/// Session routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Registration request body.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response for register and login: the user behind the new session.
#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
}

/// POST /api/auth/register - create an account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    payload.validate().map_err(AppError::Validation)?;

    if state.db.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::field_validation("email", "Email already registered"));
    }

    let password_hash = hash_password(payload.password).await?;
    let now = format_utc_rfc3339(Utc::now());

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: payload.email,
        name: payload.name,
        password_hash,
        age: None,
        weight: None,
        height: None,
        weight_unit: "kg".to_string(),
        stripe_customer_id: None,
        stripe_subscription_id: None,
        subscription_status: None,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "New user registered");

    let token = create_jwt(&user.id, &user.email, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(&state.config, token));

    Ok((
        jar,
        Json(SessionResponse {
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// POST /api/auth/login - verify credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    payload.validate().map_err(AppError::Validation)?;

    // Unknown email and wrong password produce the same error, so the
    // endpoint cannot be used to probe which emails are registered.
    let user = state
        .db
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let password_ok = verify_password(payload.password, user.password_hash.clone()).await?;
    if !password_ok {
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(&user.id, &user.email, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(&state.config, token));

    Ok((
        jar,
        Json(SessionResponse {
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// POST /api/auth/logout - clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.add(clear_session_cookie(&state.config)),
        StatusCode::NO_CONTENT,
    )
}

/// Build the session cookie for a freshly minted JWT.
fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_DAYS))
        .secure(config.frontend_url.starts_with("https"))
        .build()
}

/// Expired empty cookie with matching attributes, removing the session.
fn clear_session_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .secure(config.frontend_url.starts_with("https"))
        .build()
}

// bcrypt is CPU-bound; keep it off the async runtime

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hash failed: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verify task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verify failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_localhost_not_secure() {
        let config = Config::test_default();
        let cookie = session_cookie(&config, "tok".to_string());

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(SESSION_DAYS)));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_session_cookie_https_frontend_is_secure() {
        let mut config = Config::test_default();
        config.frontend_url = "https://fittrack.example.com".to_string();

        let cookie = session_cookie(&config, "tok".to_string());
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_clear_cookie_matches_and_expires() {
        let config = Config::test_default();
        let cookie = clear_session_cookie(&config);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[tokio::test]
    async fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2".to_string()).await.unwrap();
        assert!(verify_password("hunter2hunter2".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong-password".to_string(), hash)
            .await
            .unwrap());
    }

    #[test]
    fn test_register_request_validation() {
        let bad_email = RegisterRequest {
            name: "Test".to_string(),
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        let err = short_password.validate().unwrap_err();
        assert!(err.field_errors().contains_key("password"));

        let ok = RegisterRequest {
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
