// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog service with a process-local read cache.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Exercise, ExerciseFilter};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Concurrency cap for fan-out exercise lookups.
const MAX_CONCURRENT_LOOKUPS: usize = 20;

/// Maximum number of entries a catalog search returns.
const SEARCH_LIMIT: usize = 200;

/// Exercise catalog backed by Firestore.
///
/// Exercise documents are never mutated after creation, so cached entries
/// cannot go stale within a running instance. The cache is shared across
/// requests via `AppState`.
#[derive(Clone)]
pub struct ExerciseCatalog {
    db: FirestoreDb,
    /// In-memory cache of exercise documents keyed by ID.
    by_id: Arc<DashMap<String, Exercise>>,
}

impl ExerciseCatalog {
    /// Create a new catalog with an empty cache.
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            by_id: Arc::new(DashMap::new()),
        }
    }

    /// Get an exercise by ID, preferring the cache.
    pub async fn get(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        if let Some(cached) = self.by_id.get(exercise_id) {
            return Ok(Some(cached.value().clone()));
        }

        let exercise = self.db.get_exercise(exercise_id).await?;
        if let Some(ref exercise) = exercise {
            self.by_id.insert(exercise.id.clone(), exercise.clone());
        }

        Ok(exercise)
    }

    /// Resolve a batch of exercise IDs to documents.
    ///
    /// IDs are deduplicated first; only cache misses go to Firestore, with
    /// bounded concurrency. Unknown IDs are simply absent from the result.
    pub async fn get_many(
        &self,
        exercise_ids: &[String],
    ) -> Result<HashMap<String, Exercise>, AppError> {
        let unique: HashSet<&String> = exercise_ids.iter().collect();

        let mut found = HashMap::with_capacity(unique.len());
        let mut missing = Vec::new();

        for id in unique {
            match self.by_id.get(id) {
                Some(cached) => {
                    found.insert(id.clone(), cached.value().clone());
                }
                None => missing.push(id.clone()),
            }
        }

        if missing.is_empty() {
            return Ok(found);
        }

        let results = stream::iter(missing)
            .map(|id| {
                let db = self.db.clone();
                async move { db.get_exercise(&id).await }
            })
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .collect::<Vec<Result<Option<Exercise>, AppError>>>()
            .await;

        for result in results {
            if let Some(exercise) = result? {
                self.by_id.insert(exercise.id.clone(), exercise.clone());
                found.insert(exercise.id.clone(), exercise);
            }
        }

        Ok(found)
    }

    /// Search the catalog, applying filters in memory.
    pub async fn search(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, AppError> {
        let exercises = self.db.list_exercises().await?;

        Ok(exercises
            .into_iter()
            .filter(|e| e.matches(filter))
            .take(SEARCH_LIMIT)
            .collect())
    }

    /// Create a new exercise, rejecting duplicate names.
    pub async fn create(&self, exercise: Exercise) -> Result<Exercise, AppError> {
        if self.db.get_exercise_by_name(&exercise.name).await?.is_some() {
            return Err(AppError::field_validation(
                "name",
                "An exercise with this name already exists",
            ));
        }

        self.db.set_exercise(&exercise).await?;
        self.by_id.insert(exercise.id.clone(), exercise.clone());

        Ok(exercise)
    }
}
