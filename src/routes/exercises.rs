// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog routes: search, custom creation, previous-sets lookup.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Exercise, ExerciseFilter, SetRow, WorkoutEntry};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Extension, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Exercise routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises).post(create_exercise))
        .route("/api/exercises/{id}/previous-sets", get(previous_sets))
}

/// Catalog search parameters. Blank values count as absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseListParams {
    pub q: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
}

impl ExerciseListParams {
    fn into_filter(self) -> ExerciseFilter {
        ExerciseFilter {
            query: normalize(self.q),
            muscle_group: normalize(self.muscle_group),
            equipment: normalize(self.equipment),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `{exercises}` envelope for catalog searches.
#[derive(Serialize)]
pub struct ExerciseListResponse {
    pub exercises: Vec<Exercise>,
}

/// `{exercise}` envelope for single-exercise responses.
#[derive(Serialize)]
pub struct ExerciseResponse {
    pub exercise: Exercise,
}

/// Custom exercise creation payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub muscle_group: Option<String>,
    #[validate(length(max = 100))]
    pub equipment: Option<String>,
}

/// GET /api/exercises - search the catalog.
async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExerciseListParams>,
) -> Result<Json<ExerciseListResponse>> {
    let exercises = state.catalog.search(&params.into_filter()).await?;

    Ok(Json(ExerciseListResponse { exercises }))
}

/// POST /api/exercises - create a custom exercise.
async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateExerciseRequest>,
) -> Result<Json<ExerciseResponse>> {
    payload.validate().map_err(AppError::Validation)?;

    let exercise = state
        .catalog
        .create(Exercise {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            description: payload.description,
            muscle_group: payload.muscle_group,
            equipment: payload.equipment,
            is_custom: true,
            created_by: Some(auth.user_id),
            created_at: format_utc_rfc3339(Utc::now()),
        })
        .await?;

    tracing::info!(exercise_id = %exercise.id, "Created custom exercise");

    Ok(Json(ExerciseResponse { exercise }))
}

/// Query for the previous-sets lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousSetsParams {
    /// Workout currently being edited, excluded so a workout never serves
    /// as its own "previous".
    pub exclude_workout_id: Option<String>,
}

/// `{sets}` envelope for the previous-sets lookup.
#[derive(Serialize)]
pub struct PreviousSetsResponse {
    pub sets: Vec<SetRow>,
}

/// GET /api/exercises/{id}/previous-sets - the sets from the last time this
/// exercise was performed, used to pre-fill the logging form.
async fn previous_sets(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
    Query(params): Query<PreviousSetsParams>,
) -> Result<Json<PreviousSetsResponse>> {
    let entries = state
        .db
        .get_entries_for_exercise(&auth.user_id, &exercise_id)
        .await?;

    let sets = select_previous_sets(&entries, params.exclude_workout_id.as_deref());

    Ok(Json(PreviousSetsResponse { sets }))
}

/// Pick the rows to pre-fill from an entry history (oldest first).
///
/// The most recent entry with per-set rows wins even when legacy-only
/// entries are newer; the legacy aggregates expand into identical rows only
/// when no per-set entry exists at all. A legacy aggregate qualifies only
/// if it recorded a weight or a rep count.
fn select_previous_sets(entries: &[WorkoutEntry], exclude_workout_id: Option<&str>) -> Vec<SetRow> {
    let recent: Vec<&WorkoutEntry> = entries
        .iter()
        .rev()
        .filter(|entry| Some(entry.workout_id.as_str()) != exclude_workout_id)
        .collect();

    if let Some(entry) = recent.iter().find(|entry| !entry.set_rows.is_empty()) {
        let mut sets = entry.set_rows.clone();
        sets.sort_by_key(|row| row.set_number);
        return sets;
    }

    recent
        .iter()
        .find(|entry| entry.weight.is_some() || entry.reps.is_some())
        .map(|entry| {
            (1..=entry.sets.unwrap_or(1))
                .map(|set_number| SetRow {
                    set_number,
                    weight: entry.weight,
                    reps: entry.reps,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(workout_id: &str, date: &str) -> WorkoutEntry {
        WorkoutEntry {
            id: format!("entry-{}", workout_id),
            workout_id: workout_id.to_string(),
            user_id: "user-1".to_string(),
            exercise_id: "ex-1".to_string(),
            workout_date: date.to_string(),
            order_index: 0,
            sets: None,
            reps: None,
            weight: None,
            duration_seconds: None,
            notes: None,
            set_rows: Vec::new(),
            created_at: format!("{}T10:00:00Z", date),
        }
    }

    fn row(set_number: u32, weight: Option<f64>, reps: Option<u32>) -> SetRow {
        SetRow {
            set_number,
            weight,
            reps,
        }
    }

    #[test]
    fn test_per_set_rows_win_over_newer_legacy_entry() {
        let mut with_rows = make_entry("w-1", "2024-01-01");
        with_rows.set_rows = vec![row(1, Some(100.0), Some(5)), row(2, Some(102.5), Some(3))];

        let mut newer_legacy = make_entry("w-2", "2024-02-01");
        newer_legacy.sets = Some(3);
        newer_legacy.weight = Some(80.0);
        newer_legacy.reps = Some(8);

        let sets = select_previous_sets(&[with_rows, newer_legacy], None);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].weight, Some(100.0));
        assert_eq!(sets[1].weight, Some(102.5));
    }

    #[test]
    fn test_rows_returned_in_set_number_order() {
        let mut entry = make_entry("w-1", "2024-01-01");
        entry.set_rows = vec![
            row(3, Some(90.0), Some(2)),
            row(1, Some(100.0), Some(5)),
            row(2, Some(95.0), Some(4)),
        ];

        let sets = select_previous_sets(&[entry], None);
        let numbers: Vec<u32> = sets.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_legacy_expands_to_set_count() {
        let mut entry = make_entry("w-1", "2024-01-01");
        entry.sets = Some(3);
        entry.weight = Some(60.0);
        entry.reps = Some(10);

        let sets = select_previous_sets(&[entry], None);
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[2], row(3, Some(60.0), Some(10)));
    }

    #[test]
    fn test_legacy_without_set_count_gives_one_row() {
        let mut entry = make_entry("w-1", "2024-01-01");
        entry.weight = Some(60.0);

        let sets = select_previous_sets(&[entry], None);
        assert_eq!(sets, vec![row(1, Some(60.0), None)]);
    }

    #[test]
    fn test_legacy_with_zero_sets_gives_no_rows() {
        let mut entry = make_entry("w-1", "2024-01-01");
        entry.sets = Some(0);
        entry.weight = Some(60.0);

        assert!(select_previous_sets(&[entry], None).is_empty());
    }

    #[test]
    fn test_entry_with_only_set_count_does_not_qualify() {
        // Sets alone, with no weight or reps, is not useful for pre-fill
        let mut entry = make_entry("w-1", "2024-01-01");
        entry.sets = Some(5);

        assert!(select_previous_sets(&[entry], None).is_empty());
    }

    #[test]
    fn test_exclude_workout_skips_current_workout() {
        let mut older = make_entry("w-1", "2024-01-01");
        older.set_rows = vec![row(1, Some(100.0), Some(5))];

        let mut current = make_entry("w-2", "2024-02-01");
        current.set_rows = vec![row(1, Some(110.0), Some(3))];

        let sets = select_previous_sets(&[older, current], Some("w-2"));
        assert_eq!(sets, vec![row(1, Some(100.0), Some(5))]);
    }

    #[test]
    fn test_empty_history_gives_no_rows() {
        assert!(select_previous_sets(&[], None).is_empty());
        assert!(select_previous_sets(&[make_entry("w-1", "2024-01-01")], None).is_empty());
    }

    #[test]
    fn test_search_params_normalize_blanks() {
        let params = ExerciseListParams {
            q: Some("  bench  ".to_string()),
            muscle_group: Some("   ".to_string()),
            equipment: None,
        };
        let filter = params.into_filter();
        assert_eq!(filter.query.as_deref(), Some("bench"));
        assert_eq!(filter.muscle_group, None);
        assert_eq!(filter.equipment, None);
    }

    #[test]
    fn test_create_request_requires_name() {
        let req: CreateExerciseRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateExerciseRequest =
            serde_json::from_str(r#"{"name":"Cable Fly","muscleGroup":"Chest"}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
