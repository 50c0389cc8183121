// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress endpoint tests.
//!
//! Parameter handling runs against the offline app. The aggregation
//! scenarios (free-tier daily merge, Pro per-session, mixed legacy and
//! per-set history) run end to end against the Firestore emulator and
//! assert the exact wire-format series.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fittrack_api::models::{SetRow, User, WorkoutEntry};
use fittrack_api::AppState;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

fn progress_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ─── Parameter handling (offline) ────────────────────────────────

#[tokio::test]
async fn test_progress_requires_auth() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/analytics/progress?exerciseId=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_progress_missing_exercise_id_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(progress_request("/api/analytics/progress", &token))
        .await
        .unwrap();

    // Rejected before any database access
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "bad_request");
    assert_eq!(json["details"], "exerciseId is required");
}

#[tokio::test]
async fn test_progress_blank_exercise_id_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(progress_request("/api/analytics/progress?exerciseId=", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"], "exerciseId is required");
}

// ─── Aggregation scenarios (emulator) ────────────────────────────

async fn seed_user(state: &AppState, subscription_status: Option<&str>) -> User {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        name: "Progress Test".to_string(),
        password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
        age: None,
        weight: None,
        height: None,
        weight_unit: "kg".to_string(),
        stripe_customer_id: None,
        stripe_subscription_id: None,
        subscription_status: subscription_status.map(String::from),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    };
    state.db.upsert_user(&user).await.unwrap();
    user
}

async fn seed_exercise(state: &AppState, name: &str) -> String {
    let exercise = fittrack_api::models::Exercise {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: None,
        muscle_group: Some("Chest".to_string()),
        equipment: Some("Barbell".to_string()),
        is_custom: false,
        created_by: None,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };
    state.db.set_exercise(&exercise).await.unwrap();
    exercise.id
}

fn make_entry(user_id: &str, exercise_id: &str, workout_date: &str) -> WorkoutEntry {
    WorkoutEntry {
        id: Uuid::new_v4().to_string(),
        workout_id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        exercise_id: exercise_id.to_string(),
        workout_date: workout_date.to_string(),
        order_index: 0,
        sets: None,
        reps: None,
        weight: None,
        duration_seconds: None,
        notes: None,
        set_rows: Vec::new(),
        created_at: workout_date.to_string(),
    }
}

fn row(set_number: u32, weight: f64, reps: u32) -> SetRow {
    SetRow {
        set_number,
        weight: Some(weight),
        reps: Some(reps),
    }
}

#[tokio::test]
async fn test_free_tier_single_session_with_rows() {
    require_emulator!();
    let (app, state) = common::create_emulator_test_app().await;

    let user = seed_user(&state, None).await;
    let exercise_id = seed_exercise(&state, "Bench Press").await;

    let mut entry = make_entry(&user.id, &exercise_id, "2024-01-01T00:00:00Z");
    entry.set_rows = vec![row(1, 100.0, 5), row(2, 100.0, 3)];
    state.db.batch_set_entries(&[entry]).await.unwrap();

    let token = common::create_test_jwt(&user.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(progress_request(
            &format!("/api/analytics/progress?exerciseId={}", exercise_id),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "exerciseId": exercise_id,
            "exerciseName": "Bench Press",
            "data": [
                {"date": "2024-01-01", "weight": 100.0, "reps": 8, "volume": 800.0, "sets": 2}
            ]
        })
    );

    println!("✓ Free-tier series: one merged point with max weight and totals");
}

#[tokio::test]
async fn test_free_tier_merges_legacy_and_rows_same_day() {
    require_emulator!();
    let (app, state) = common::create_emulator_test_app().await;

    let user = seed_user(&state, None).await;
    let exercise_id = seed_exercise(&state, "Squat").await;

    // Morning session recorded the old way, evening session with rows
    let mut morning = make_entry(&user.id, &exercise_id, "2024-01-05T08:00:00Z");
    morning.sets = Some(3);
    morning.reps = Some(10);
    morning.weight = Some(50.0);

    let mut evening = make_entry(&user.id, &exercise_id, "2024-01-05T18:00:00Z");
    evening.set_rows = vec![row(1, 60.0, 8)];

    state.db.batch_set_entries(&[morning, evening]).await.unwrap();

    let token = common::create_test_jwt(&user.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(progress_request(
            &format!("/api/analytics/progress?exerciseId={}", exercise_id),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        serde_json::json!([
            {"date": "2024-01-05", "weight": 60.0, "reps": 38, "volume": 1980.0, "sets": 4}
        ])
    );

    println!("✓ Same-day legacy and per-set sessions merge into one point");
}

#[tokio::test]
async fn test_subscriber_gets_per_session_points() {
    require_emulator!();
    let (app, state) = common::create_emulator_test_app().await;

    let user = seed_user(&state, Some("active")).await;
    let exercise_id = seed_exercise(&state, "Deadlift").await;

    let mut first = make_entry(&user.id, &exercise_id, "2024-01-05T08:00:00Z");
    first.set_rows = vec![row(1, 100.0, 5)];
    let mut second = make_entry(&user.id, &exercise_id, "2024-01-05T18:00:00Z");
    second.set_rows = vec![row(1, 105.0, 3)];

    state.db.batch_set_entries(&[first, second]).await.unwrap();

    let token = common::create_test_jwt(&user.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(progress_request(
            &format!("/api/analytics/progress?exerciseId={}", exercise_id),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        serde_json::json!([
            {"date": "2024-01-05", "weight": 100.0, "reps": 5, "volume": 500.0, "sets": 1},
            {"date": "2024-01-05", "weight": 105.0, "reps": 3, "volume": 315.0, "sets": 1}
        ])
    );

    println!("✓ Subscriber series keeps same-day sessions separate");
}

#[tokio::test]
async fn test_canceled_subscription_falls_back_to_daily_merge() {
    require_emulator!();
    let (app, state) = common::create_emulator_test_app().await;

    let user = seed_user(&state, Some("canceled")).await;
    let exercise_id = seed_exercise(&state, "Overhead Press").await;

    let mut first = make_entry(&user.id, &exercise_id, "2024-01-05T08:00:00Z");
    first.set_rows = vec![row(1, 40.0, 5)];
    let mut second = make_entry(&user.id, &exercise_id, "2024-01-05T18:00:00Z");
    second.set_rows = vec![row(1, 42.5, 5)];

    state.db.batch_set_entries(&[first, second]).await.unwrap();

    let token = common::create_test_jwt(&user.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(progress_request(
            &format!("/api/analytics/progress?exerciseId={}", exercise_id),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["sets"], 2);

    println!("✓ Canceled subscription charts with the free-tier policy");
}

#[tokio::test]
async fn test_unused_exercise_yields_empty_series() {
    require_emulator!();
    let (app, state) = common::create_emulator_test_app().await;

    let user = seed_user(&state, None).await;
    let exercise_id = Uuid::new_v4().to_string();

    let token = common::create_test_jwt(&user.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(progress_request(
            &format!("/api/analytics/progress?exerciseId={}", exercise_id),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "exerciseId": exercise_id,
            "exerciseName": "Exercise",
            "data": []
        })
    );

    println!("✓ Unused exercise id charts as an empty placeholder series");
}

#[tokio::test]
async fn test_progress_only_sees_own_entries() {
    require_emulator!();
    let (app, state) = common::create_emulator_test_app().await;

    let user = seed_user(&state, None).await;
    let other = seed_user(&state, None).await;
    let exercise_id = seed_exercise(&state, "Barbell Row").await;

    let mut mine = make_entry(&user.id, &exercise_id, "2024-01-01T00:00:00Z");
    mine.set_rows = vec![row(1, 60.0, 10)];
    let mut theirs = make_entry(&other.id, &exercise_id, "2024-01-02T00:00:00Z");
    theirs.set_rows = vec![row(1, 200.0, 10)];

    state.db.batch_set_entries(&[mine, theirs]).await.unwrap();

    let token = common::create_test_jwt(&user.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(progress_request(
            &format!("/api/analytics/progress?exerciseId={}", exercise_id),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["weight"], 60.0);

    println!("✓ Progress series excludes other users' entries");
}
