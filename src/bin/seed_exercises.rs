// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog seeder.
//!
//! Populates the `exercises` collection with the standard catalog. Safe to
//! run repeatedly: entries are matched by name and existing ones are left
//! untouched, so user-created exercises and prior seeds survive.
//!
//! Usage: `cargo run --bin seed_exercises` (honors `GCP_PROJECT_ID` and
//! `FIRESTORE_EMULATOR_HOST`).

use chrono::Utc;
use fittrack_api::db::FirestoreDb;
use fittrack_api::models::Exercise;
use fittrack_api::time_utils::format_utc_rfc3339;
use uuid::Uuid;

/// One catalog entry: name, description, muscle group, equipment.
type SeedEntry = (&'static str, &'static str, &'static str, &'static str);

const CATALOG: &[SeedEntry] = &[
    // Chest
    ("Bench Press", "Barbell flat bench press", "Chest", "Barbell"),
    ("Incline Dumbbell Press", "Incline bench dumbbell press", "Chest", "Dumbbell"),
    ("Push-ups", "Bodyweight push-ups", "Chest", "Bodyweight"),
    ("Cable Fly", "Cable chest fly", "Chest", "Cable"),
    ("Dips", "Chest/triceps dips", "Chest", "Bodyweight"),
    // Back
    ("Deadlift", "Conventional barbell deadlift", "Back", "Barbell"),
    ("Barbell Row", "Bent-over barbell row", "Back", "Barbell"),
    ("Pull-ups", "Wide-grip pull-ups", "Back", "Bodyweight"),
    ("Lat Pulldown", "Cable lat pulldown", "Back", "Cable"),
    ("Dumbbell Row", "Single-arm dumbbell row", "Back", "Dumbbell"),
    ("Face Pull", "Cable face pull for rear delts", "Back", "Cable"),
    // Shoulders
    ("Overhead Press", "Barbell overhead press", "Shoulders", "Barbell"),
    ("Dumbbell Lateral Raise", "Lateral raise", "Shoulders", "Dumbbell"),
    ("Arnold Press", "Arnold dumbbell press", "Shoulders", "Dumbbell"),
    ("Front Raise", "Dumbbell front raise", "Shoulders", "Dumbbell"),
    // Legs
    ("Squat", "Barbell back squat", "Legs", "Barbell"),
    ("Romanian Deadlift", "RDL for hamstrings", "Legs", "Barbell"),
    ("Leg Press", "Leg press machine", "Legs", "Machine"),
    ("Leg Curl", "Leg curl machine", "Legs", "Machine"),
    ("Leg Extension", "Leg extension machine", "Legs", "Machine"),
    ("Lunges", "Walking or stationary lunges", "Legs", "Dumbbell"),
    ("Calf Raise", "Standing or seated calf raise", "Legs", "Machine"),
    // Arms
    ("Barbell Curl", "Standing barbell curl", "Biceps", "Barbell"),
    ("Hammer Curl", "Dumbbell hammer curl", "Biceps", "Dumbbell"),
    ("Tricep Pushdown", "Cable tricep pushdown", "Triceps", "Cable"),
    ("Skull Crusher", "Lying tricep extension", "Triceps", "Barbell"),
    ("Close-Grip Bench", "Close-grip bench press", "Triceps", "Barbell"),
    // Core
    ("Plank", "Front plank hold", "Core", "Bodyweight"),
    ("Crunches", "Ab crunches", "Core", "Bodyweight"),
    ("Russian Twist", "Russian twist with weight", "Core", "Dumbbell"),
    ("Hanging Leg Raise", "Hanging leg raise", "Core", "Bodyweight"),
    // Cardio
    ("Running", "Treadmill or outdoor run", "Cardio", "Treadmill"),
    ("Cycling", "Stationary or road cycling", "Cardio", "Bike"),
    ("Rowing", "Rowing machine", "Cardio", "Rowing Machine"),
    ("Jump Rope", "Jump rope", "Cardio", "Jump Rope"),
    ("Elliptical", "Elliptical machine", "Cardio", "Elliptical"),
    // Flexibility
    ("Stretching", "General stretching", "Flexibility", "Bodyweight"),
    ("Yoga", "Yoga flow or holds", "Flexibility", "Bodyweight"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let project_id =
        std::env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());

    let db = FirestoreDb::new(&project_id).await?;

    let mut created = 0usize;
    let mut skipped = 0usize;

    for (name, description, muscle_group, equipment) in CATALOG {
        if db.get_exercise_by_name(name).await?.is_some() {
            skipped += 1;
            continue;
        }

        let exercise = Exercise {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            muscle_group: Some((*muscle_group).to_string()),
            equipment: Some((*equipment).to_string()),
            is_custom: false,
            created_by: None,
            created_at: format_utc_rfc3339(Utc::now()),
        };
        db.set_exercise(&exercise).await?;
        tracing::info!(name, "Seeded exercise");
        created += 1;
    }

    tracing::info!(created, skipped, total = CATALOG.len(), "Catalog seeding done");
    Ok(())
}
