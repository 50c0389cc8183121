// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout and workout-entry models for storage and API.

use serde::{Deserialize, Serialize};

/// Stored workout record in Firestore.
///
/// Serialized in camelCase; these documents go straight into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// UUID (also used as document ID)
    pub id: String,
    /// Owning user's ID
    pub user_id: String,
    /// When the workout was performed (ISO 8601)
    pub date: String,
    /// Optional session name ("Push day")
    pub name: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When this record was created (ISO 8601)
    pub created_at: String,
    /// Last modification (ISO 8601)
    pub updated_at: String,
}

/// One performed set within a workout entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRow {
    /// 1-based position within the entry
    pub set_number: u32,
    /// Weight lifted; absent when not recorded (bodyweight work, etc.)
    pub weight: Option<f64>,
    /// Repetitions; absent when not recorded
    pub reps: Option<u32>,
}

/// Workout-exercise join record for efficient queries.
///
/// `user_id` and `workout_date` are denormalized from the parent workout so
/// progress and history queries can run against this collection alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    /// UUID (also used as document ID)
    pub id: String,
    /// Parent workout ID
    pub workout_id: String,
    /// Owning user's ID (denormalized)
    pub user_id: String,
    /// Exercise performed
    pub exercise_id: String,
    /// Parent workout date (denormalized, ISO 8601)
    pub workout_date: String,
    /// Position within the workout
    pub order_index: u32,
    /// Legacy aggregate: number of sets
    pub sets: Option<u32>,
    /// Legacy aggregate: reps per set
    pub reps: Option<u32>,
    /// Legacy aggregate: weight used
    pub weight: Option<f64>,
    /// Duration for timed exercises (seconds)
    pub duration_seconds: Option<u32>,
    /// Per-entry notes
    pub notes: Option<String>,
    /// Per-set rows; empty for entries recorded before per-set logging
    #[serde(default)]
    pub set_rows: Vec<SetRow>,
    /// When this record was created (ISO 8601; ordering tie-break)
    pub created_at: String,
}

/// Aggregate columns derived from per-set rows at write time, so readers of
/// the legacy `sets`/`reps`/`weight` columns see sane values for per-set
/// entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySummary {
    /// Number of rows recorded
    pub sets: u32,
    /// Heaviest single-set weight; absent when there are no rows
    pub weight: Option<f64>,
    /// Total reps across all rows; absent when there are no rows
    pub reps: Option<u32>,
}

/// Summarize per-set rows into the legacy aggregate columns.
///
/// With no rows, `weight` and `reps` stay absent and callers fall back to
/// whatever explicit legacy values the client supplied. Unrecorded weights
/// and reps within a row count as zero.
pub fn derive_legacy_summary(rows: &[SetRow]) -> LegacySummary {
    if rows.is_empty() {
        return LegacySummary {
            sets: 0,
            weight: None,
            reps: None,
        };
    }

    let mut weight: f64 = 0.0;
    let mut reps: u32 = 0;
    for row in rows {
        weight = weight.max(row.weight.unwrap_or(0.0));
        reps += row.reps.unwrap_or(0);
    }

    LegacySummary {
        sets: rows.len() as u32,
        weight: Some(weight),
        reps: Some(reps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(set_number: u32, weight: Option<f64>, reps: Option<u32>) -> SetRow {
        SetRow {
            set_number,
            weight,
            reps,
        }
    }

    #[test]
    fn test_summary_takes_max_weight_and_total_reps() {
        let rows = vec![
            row(1, Some(80.0), Some(5)),
            row(2, Some(85.0), Some(5)),
            row(3, Some(80.0), Some(5)),
        ];

        let summary = derive_legacy_summary(&rows);

        assert_eq!(summary.sets, 3);
        assert_eq!(summary.weight, Some(85.0));
        assert_eq!(summary.reps, Some(15));
    }

    #[test]
    fn test_summary_of_no_rows_leaves_aggregates_absent() {
        let summary = derive_legacy_summary(&[]);

        assert_eq!(summary.sets, 0);
        assert_eq!(summary.weight, None);
        assert_eq!(summary.reps, None);
    }

    #[test]
    fn test_unrecorded_values_count_as_zero() {
        let rows = vec![row(1, None, Some(12)), row(2, Some(40.0), None)];

        let summary = derive_legacy_summary(&rows);

        assert_eq!(summary.sets, 2);
        assert_eq!(summary.weight, Some(40.0));
        assert_eq!(summary.reps, Some(12));
    }

    #[test]
    fn test_all_bodyweight_rows_summarize_to_zero_weight() {
        let rows = vec![row(1, None, Some(10)), row(2, None, Some(8))];

        let summary = derive_legacy_summary(&rows);

        assert_eq!(summary.weight, Some(0.0));
        assert_eq!(summary.reps, Some(18));
    }
}
