// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout template routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Exercise, TemplateExercise, WorkoutTemplate};
use crate::routes::workouts::DeleteResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Extension, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Template routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/templates", get(list_templates).post(create_template))
        .route(
            "/api/templates/{id}",
            get(get_template).delete(delete_template),
        )
}

/// Template creation payload. Unlike workout saves, the whole payload is
/// validated strictly; a bad exercise fails the request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(nested)]
    pub exercises: Vec<TemplateExercisePayload>,
}

/// One planned exercise in a template creation payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercisePayload {
    #[validate(custom(function = validate_uuid))]
    pub exercise_id: String,
    #[serde(default = "default_sets")]
    #[validate(range(min = 1, max = 20))]
    pub default_sets: u32,
}

fn default_sets() -> u32 {
    1
}

fn validate_uuid(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if Uuid::parse_str(value).is_ok() {
        return Ok(());
    }
    Err(validator::ValidationError::new("uuid"))
}

/// Planned exercise with its exercise document attached.
#[derive(Debug, Serialize)]
pub struct TemplateExerciseDetail {
    #[serde(flatten)]
    pub planned: TemplateExercise,
    pub exercise: Option<Exercise>,
}

/// Template as returned by the API, exercise documents embedded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetail {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
    pub exercises: Vec<TemplateExerciseDetail>,
}

/// `{templates}` envelope for the template list.
#[derive(Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateDetail>,
}

/// `{template}` envelope for single-template responses.
#[derive(Serialize)]
pub struct TemplateResponse {
    pub template: TemplateDetail,
}

/// GET /api/templates - the user's templates, newest first.
async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TemplateListResponse>> {
    let templates = state.db.get_templates_for_user(&auth.user_id).await?;

    let exercise_ids: Vec<String> = templates
        .iter()
        .flat_map(|t| t.exercises.iter().map(|ex| ex.exercise_id.clone()))
        .collect();
    let exercise_docs = state.catalog.get_many(&exercise_ids).await?;

    let templates = templates
        .into_iter()
        .map(|template| build_detail(template, &exercise_docs))
        .collect();

    Ok(Json(TemplateListResponse { templates }))
}

/// POST /api/templates - save a new template.
async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<Json<TemplateResponse>> {
    payload.validate().map_err(AppError::Validation)?;

    let template = WorkoutTemplate {
        id: Uuid::new_v4().to_string(),
        user_id: auth.user_id,
        name: payload.name,
        exercises: payload
            .exercises
            .into_iter()
            .enumerate()
            .map(|(index, ex)| TemplateExercise {
                exercise_id: ex.exercise_id,
                order_index: index as u32,
                default_sets: ex.default_sets,
            })
            .collect(),
        created_at: format_utc_rfc3339(Utc::now()),
    };

    state.db.set_template(&template).await?;

    tracing::info!(template_id = %template.id, "Created workout template");

    let exercise_ids: Vec<String> = template
        .exercises
        .iter()
        .map(|ex| ex.exercise_id.clone())
        .collect();
    let exercise_docs = state.catalog.get_many(&exercise_ids).await?;

    Ok(Json(TemplateResponse {
        template: build_detail(template, &exercise_docs),
    }))
}

/// GET /api/templates/{id} - one template.
async fn get_template(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateResponse>> {
    let template = load_owned_template(&state, &auth.user_id, &template_id).await?;

    let exercise_ids: Vec<String> = template
        .exercises
        .iter()
        .map(|ex| ex.exercise_id.clone())
        .collect();
    let exercise_docs = state.catalog.get_many(&exercise_ids).await?;

    Ok(Json(TemplateResponse {
        template: build_detail(template, &exercise_docs),
    }))
}

/// DELETE /api/templates/{id} - remove a template.
async fn delete_template(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(template_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let template = load_owned_template(&state, &auth.user_id, &template_id).await?;

    state.db.delete_template(&template.id).await?;

    Ok(Json(DeleteResponse { ok: true }))
}

/// Load a template, treating foreign and missing IDs the same way.
async fn load_owned_template(
    state: &AppState,
    user_id: &str,
    template_id: &str,
) -> Result<WorkoutTemplate> {
    state
        .db
        .get_template(template_id)
        .await?
        .filter(|template| template.user_id == user_id)
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
}

fn build_detail(
    template: WorkoutTemplate,
    exercise_docs: &HashMap<String, Exercise>,
) -> TemplateDetail {
    let mut planned = template.exercises;
    planned.sort_by_key(|ex| ex.order_index);

    TemplateDetail {
        id: template.id,
        user_id: template.user_id,
        name: template.name,
        created_at: template.created_at,
        exercises: planned
            .into_iter()
            .map(|ex| TemplateExerciseDetail {
                exercise: exercise_docs.get(&ex.exercise_id).cloned(),
                planned: ex,
            })
            .collect(),
    }
}
