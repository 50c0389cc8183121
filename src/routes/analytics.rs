// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics routes: progress series for charting and dashboard stats.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{compute_progress, ProgressPoint, ProgressPolicy, Workout};
use crate::routes::workouts::{load_details, WorkoutDetail};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Json, Query, State},
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How many workouts the dashboard shows.
const RECENT_WORKOUTS: usize = 5;

/// Analytics routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analytics/progress", get(get_progress))
        .route("/api/analytics/stats", get(get_stats))
}

/// Query for the progress series.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressParams {
    pub exercise_id: Option<String>,
}

/// Chartable progress series for one exercise.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressResponse {
    pub exercise_id: String,
    pub exercise_name: String,
    pub data: Vec<ProgressPoint>,
}

/// GET /api/analytics/progress?exerciseId= - progress series for charts.
///
/// Subscribers get one point per session; the free tier gets same-day
/// sessions merged into one point per calendar date.
async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ProgressParams>,
) -> Result<Json<ProgressResponse>> {
    let exercise_id = require_exercise_id(params)?;

    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let policy = if user.has_active_subscription() {
        ProgressPolicy::PerSession
    } else {
        ProgressPolicy::DailyMerge
    };

    let entries = state
        .db
        .get_entries_for_exercise(&auth.user_id, &exercise_id)
        .await?;

    // An exercise is only named if it was actually performed; unknown and
    // unused ids both chart as an empty "Exercise" series.
    let exercise_name = if entries.is_empty() {
        "Exercise".to_string()
    } else {
        state
            .catalog
            .get(&exercise_id)
            .await?
            .map(|exercise| exercise.name)
            .unwrap_or_else(|| "Exercise".to_string())
    };

    let data = compute_progress(&entries, policy);

    Ok(Json(ProgressResponse {
        exercise_id,
        exercise_name,
        data,
    }))
}

fn require_exercise_id(params: ProgressParams) -> Result<String> {
    params
        .exercise_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("exerciseId is required".to_string()))
}

/// Dashboard stat counters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCounts {
    pub workouts_this_week: usize,
    pub workouts_this_month: usize,
    pub total_workouts: usize,
}

/// `{stats, recentWorkouts}` envelope for the dashboard.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: StatCounts,
    pub recent_workouts: Vec<WorkoutDetail>,
}

/// GET /api/analytics/stats - dashboard counters and recent workouts.
///
/// The week and month windows are rolling, measured back from now, not
/// aligned to calendar boundaries.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<StatsResponse>> {
    let (week_start, month_start) = window_starts(Utc::now());

    let workouts = state.db.get_workouts_for_user(&auth.user_id).await?;

    let total_workouts = workouts.len();
    let workouts_this_week = workouts.iter().filter(|w| w.date >= week_start).count();
    let workouts_this_month = workouts.iter().filter(|w| w.date >= month_start).count();

    let recent: Vec<Workout> = workouts.into_iter().take(RECENT_WORKOUTS).collect();
    let recent_workouts = load_details(&state, recent).await?;

    Ok(Json(StatsResponse {
        stats: StatCounts {
            workouts_this_week,
            workouts_this_month,
            total_workouts,
        },
        recent_workouts,
    }))
}

/// Window cutoffs as stored-format date strings, so counting can compare
/// lexicographically against workout dates.
fn window_starts(now: DateTime<Utc>) -> (String, String) {
    let week = format_utc_rfc3339(now - Duration::days(7));
    let month = format_utc_rfc3339(now.checked_sub_months(Months::new(1)).unwrap_or(now));
    (week, month)
}
