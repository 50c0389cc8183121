// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout CRUD routes.
//!
//! A workout is saved as one request carrying the workout document plus its
//! entry list; updates rewrite the entry list wholesale when one is sent.
//! Responses embed entries with their exercise documents attached.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{derive_legacy_summary, Exercise, SetRow, Workout, WorkoutEntry};
use crate::time_utils::{format_utc_rfc3339, parse_workout_date};
use crate::AppState;
use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Extension, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 100;

/// Workout routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/workouts/{id}",
            get(get_workout).patch(update_workout).delete(delete_workout),
        )
}

// ─── Request Payloads ────────────────────────────────────────────

/// Workout document fields accepted on save.
#[derive(Debug, Deserialize, Validate)]
pub struct WorkoutPayload {
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// One exercise entry accepted on save.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    #[validate(custom(function = validate_uuid))]
    pub exercise_id: String,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub duration_seconds: Option<u32>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub set_rows: Vec<SetRowPayload>,
}

/// One per-set row accepted on save.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetRowPayload {
    #[validate(range(min = 1))]
    pub set_number: u32,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub reps: Option<u32>,
}

fn validate_uuid(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if Uuid::parse_str(value).is_ok() {
        return Ok(());
    }
    Err(validator::ValidationError::new("uuid"))
}

/// POST body: the workout document plus its entries.
#[derive(Debug, Deserialize)]
pub struct SaveWorkoutRequest {
    pub workout: WorkoutPayload,
    /// Entries are validated one by one; invalid ones are skipped rather
    /// than failing the whole save.
    #[serde(default)]
    pub exercises: Vec<serde_json::Value>,
}

/// PATCH body. Absent sections are left untouched; an `exercises` array
/// (even an empty one) replaces the entry list wholesale.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub workout: Option<WorkoutPayload>,
    pub exercises: Option<Vec<serde_json::Value>>,
}

// ─── Response Shapes ─────────────────────────────────────────────

/// Stored entry joined with its exercise document, rows in set order.
#[derive(Debug, Serialize)]
pub struct EntryDetail {
    #[serde(flatten)]
    pub entry: WorkoutEntry,
    pub exercise: Option<Exercise>,
}

impl EntryDetail {
    fn new(mut entry: WorkoutEntry, exercise: Option<Exercise>) -> Self {
        entry.set_rows.sort_by_key(|row| row.set_number);
        Self { entry, exercise }
    }
}

/// Workout as returned by the API, entries embedded.
#[derive(Debug, Serialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<EntryDetail>,
}

/// `{workouts, total}` envelope for the paginated list.
#[derive(Serialize)]
pub struct WorkoutListResponse {
    pub workouts: Vec<WorkoutDetail>,
    pub total: usize,
}

/// `{workout}` envelope for single-workout responses.
#[derive(Serialize)]
pub struct WorkoutResponse {
    pub workout: WorkoutDetail,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Pagination query for the workout list.
#[derive(Debug, Deserialize)]
pub struct WorkoutListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Effective page size: default 50, capped at 100; zero means unspecified.
fn page_limit(requested: Option<usize>) -> usize {
    requested
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE)
}

// ─── Handlers ────────────────────────────────────────────────────

/// GET /api/workouts - paginated history, newest first.
async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<WorkoutListParams>,
) -> Result<Json<WorkoutListResponse>> {
    let limit = page_limit(params.limit);
    let offset = params.offset.unwrap_or(0);

    let all = state.db.get_workouts_for_user(&auth.user_id).await?;
    let total = all.len();
    let page: Vec<Workout> = all.into_iter().skip(offset).take(limit).collect();

    let workouts = load_details(&state, page).await?;

    Ok(Json(WorkoutListResponse { workouts, total }))
}

/// POST /api/workouts - save a workout with its entries.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SaveWorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    payload.workout.validate().map_err(AppError::Validation)?;
    let date = parse_workout_date(&payload.workout.date)
        .ok_or_else(|| AppError::BadRequest("Invalid date".to_string()))?;

    let now = format_utc_rfc3339(Utc::now());
    let workout = Workout {
        id: Uuid::new_v4().to_string(),
        user_id: auth.user_id.clone(),
        date: format_utc_rfc3339(date),
        name: payload.workout.name,
        notes: payload.workout.notes,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.set_workout(&workout).await?;
    let entries = store_entries(&state, &workout, &payload.exercises).await?;

    tracing::info!(
        workout_id = %workout.id,
        entries = entries.len(),
        "Created workout"
    );

    let workout = to_detail(&state, workout, entries).await?;
    Ok(Json(WorkoutResponse { workout }))
}

/// GET /api/workouts/{id} - one workout with entries.
async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(workout_id): Path<String>,
) -> Result<Json<WorkoutResponse>> {
    let workout = load_owned_workout(&state, &auth.user_id, &workout_id).await?;
    let entries = state.db.get_entries_for_workout(&workout.id).await?;

    let workout = to_detail(&state, workout, entries).await?;
    Ok(Json(WorkoutResponse { workout }))
}

/// PATCH /api/workouts/{id} - update the document and/or replace entries.
async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(workout_id): Path<String>,
    Json(payload): Json<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    let mut workout = load_owned_workout(&state, &auth.user_id, &workout_id).await?;
    let previous_date = workout.date.clone();

    if let Some(data) = payload.workout {
        data.validate().map_err(AppError::Validation)?;
        workout.date = parse_workout_date(&data.date)
            .map(format_utc_rfc3339)
            .ok_or_else(|| AppError::BadRequest("Invalid date".to_string()))?;
        if data.name.is_some() {
            workout.name = data.name;
        }
        if data.notes.is_some() {
            workout.notes = data.notes;
        }
    }
    workout.updated_at = format_utc_rfc3339(Utc::now());
    state.db.set_workout(&workout).await?;

    let entries = match payload.exercises {
        Some(exercises) => {
            state.db.delete_entries_for_workout(&workout.id).await?;
            store_entries(&state, &workout, &exercises).await?
        }
        None => {
            let mut entries = state.db.get_entries_for_workout(&workout.id).await?;
            // Entries denormalize the workout date; keep them in sync when
            // the date changes without an entry rewrite.
            if workout.date != previous_date {
                for entry in &mut entries {
                    entry.workout_date = workout.date.clone();
                }
                state.db.batch_set_entries(&entries).await?;
            }
            entries
        }
    };

    let workout = to_detail(&state, workout, entries).await?;
    Ok(Json(WorkoutResponse { workout }))
}

/// DELETE /api/workouts/{id} - remove a workout and its entries.
async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(workout_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let workout = load_owned_workout(&state, &auth.user_id, &workout_id).await?;

    state.db.delete_entries_for_workout(&workout.id).await?;
    state.db.delete_workout(&workout.id).await?;

    tracing::info!(workout_id = %workout.id, "Deleted workout");

    Ok(Json(DeleteResponse { ok: true }))
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Load a workout, treating foreign and missing IDs the same way.
async fn load_owned_workout(
    state: &AppState,
    user_id: &str,
    workout_id: &str,
) -> Result<Workout> {
    state
        .db
        .get_workout(workout_id)
        .await?
        .filter(|workout| workout.user_id == user_id)
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
}

/// Validate and store the entry list for a workout.
///
/// Invalid entries are skipped with a warning; the rest of the save
/// proceeds. Returns the stored entries.
async fn store_entries(
    state: &AppState,
    workout: &Workout,
    exercises: &[serde_json::Value],
) -> Result<Vec<WorkoutEntry>> {
    let now = format_utc_rfc3339(Utc::now());
    let mut entries: Vec<WorkoutEntry> = Vec::with_capacity(exercises.len());

    for value in exercises {
        let payload: EntryPayload = match serde_json::from_value(value.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed workout entry");
                continue;
            }
        };
        if let Err(e) = payload.validate() {
            tracing::warn!(error = %e, "Skipping invalid workout entry");
            continue;
        }

        let order_index = entries.len() as u32;
        entries.push(build_entry(workout, order_index, payload, &now));
    }

    state.db.batch_set_entries(&entries).await?;

    Ok(entries)
}

/// Build a storable entry, deriving the legacy aggregate columns from the
/// per-set rows when rows are present.
fn build_entry(
    workout: &Workout,
    order_index: u32,
    payload: EntryPayload,
    created_at: &str,
) -> WorkoutEntry {
    let mut set_rows: Vec<SetRow> = payload
        .set_rows
        .iter()
        .map(|row| SetRow {
            set_number: row.set_number,
            weight: row.weight,
            reps: row.reps,
        })
        .collect();
    set_rows.sort_by_key(|row| row.set_number);

    let summary = derive_legacy_summary(&set_rows);
    let sets = if summary.sets > 0 {
        Some(summary.sets)
    } else {
        payload.sets
    };

    WorkoutEntry {
        id: Uuid::new_v4().to_string(),
        workout_id: workout.id.clone(),
        user_id: workout.user_id.clone(),
        exercise_id: payload.exercise_id,
        workout_date: workout.date.clone(),
        order_index,
        sets,
        reps: summary.reps.or(payload.reps),
        weight: summary.weight.or(payload.weight),
        duration_seconds: payload.duration_seconds,
        notes: payload.notes,
        set_rows,
        created_at: created_at.to_string(),
    }
}

/// Join several workouts with their entries and exercise documents.
pub(crate) async fn load_details(
    state: &AppState,
    workouts: Vec<Workout>,
) -> Result<Vec<WorkoutDetail>> {
    let workout_ids: Vec<String> = workouts.iter().map(|w| w.id.clone()).collect();
    let entries = state.db.get_entries_for_workouts(&workout_ids).await?;

    let exercise_ids: Vec<String> = entries.iter().map(|e| e.exercise_id.clone()).collect();
    let exercise_docs = state.catalog.get_many(&exercise_ids).await?;

    let mut by_workout: HashMap<String, Vec<WorkoutEntry>> = HashMap::new();
    for entry in entries {
        by_workout
            .entry(entry.workout_id.clone())
            .or_default()
            .push(entry);
    }

    Ok(workouts
        .into_iter()
        .map(|workout| {
            let entries = by_workout.remove(&workout.id).unwrap_or_default();
            build_detail(workout, entries, &exercise_docs)
        })
        .collect())
}

/// Attach exercise documents to a single workout's entries.
async fn to_detail(
    state: &AppState,
    workout: Workout,
    entries: Vec<WorkoutEntry>,
) -> Result<WorkoutDetail> {
    let exercise_ids: Vec<String> = entries.iter().map(|e| e.exercise_id.clone()).collect();
    let exercise_docs = state.catalog.get_many(&exercise_ids).await?;

    Ok(build_detail(workout, entries, &exercise_docs))
}

fn build_detail(
    workout: Workout,
    mut entries: Vec<WorkoutEntry>,
    exercise_docs: &HashMap<String, Exercise>,
) -> WorkoutDetail {
    entries.sort_by_key(|entry| entry.order_index);

    let exercises = entries
        .into_iter()
        .map(|entry| {
            let exercise = exercise_docs.get(&entry.exercise_id).cloned();
            EntryDetail::new(entry, exercise)
        })
        .collect();

    WorkoutDetail { workout, exercises }
}
