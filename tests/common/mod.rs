// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fittrack_api::config::Config;
use fittrack_api::db::FirestoreDb;
use fittrack_api::middleware::auth::create_jwt;
use fittrack_api::routes::create_router;
use fittrack_api::services::{ExerciseCatalog, StripeClient};
use fittrack_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build the router and shared state over an arbitrary config and database.
#[allow(dead_code)]
pub fn create_app_with(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let catalog = ExerciseCatalog::new(db.clone());
    let stripe = StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_webhook_secret.clone(),
    );

    let state = Arc::new(AppState {
        config,
        db,
        catalog,
        stripe,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(Config::test_default(), test_db_offline())
}

/// Create an offline test app with a specific frontend URL (cookie and CORS
/// behavior depends on it).
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_app_with(config, test_db_offline())
}

/// Create a test app backed by the Firestore emulator.
#[allow(dead_code)]
pub async fn create_emulator_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(Config::test_default(), test_db().await)
}

/// Session token for a user, signed with the app's key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, "test@example.com", signing_key).expect("Failed to create JWT")
}
