// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitTrack: workout logging and strength progress tracking
//!
//! This crate provides the backend API for recording workouts and
//! charting per-exercise strength progress over time.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ExerciseCatalog, StripeClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub catalog: ExerciseCatalog,
    pub stripe: StripeClient,
}
