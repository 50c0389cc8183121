// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitTrack API Server
//!
//! Records workouts, derives per-exercise strength progress, and manages
//! Pro subscriptions through Stripe.

use fittrack_api::{
    config::Config,
    db::FirestoreDb,
    services::{ExerciseCatalog, StripeClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting FitTrack API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Exercise catalog with in-process cache
    let catalog = ExerciseCatalog::new(db.clone());

    // Stripe client for checkout and webhook processing
    let stripe = StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_webhook_secret.clone(),
    );
    if config.stripe_price_id.is_none() {
        tracing::warn!("STRIPE_PRICE_ID not set; checkout is disabled");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        catalog,
        stripe,
    });

    // Build router
    let app = fittrack_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fittrack_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
