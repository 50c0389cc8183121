// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts, profiles, subscription state)
//! - Exercises (seeded catalog plus user-created entries)
//! - Workouts and workout entries (join collection for history queries)
//! - Templates (saved workout plans)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Exercise, User, Workout, WorkoutEntry, WorkoutTemplate};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by email address.
    ///
    /// Email uniqueness is enforced by this lookup at registration time.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Look up a user by Stripe subscription ID.
    ///
    /// Used by the webhook handler for `customer.subscription.deleted`,
    /// which carries no customer email.
    pub async fn get_user_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<User>, AppError> {
        let subscription_id = subscription_id.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("stripeSubscriptionId").eq(subscription_id.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Exercise Operations ─────────────────────────────────────

    /// Get an exercise by ID.
    pub async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EXERCISES)
            .obj()
            .one(exercise_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up an exercise by exact name.
    ///
    /// Used for the duplicate check on custom creation and to keep seeding
    /// idempotent.
    pub async fn get_exercise_by_name(&self, name: &str) -> Result<Option<Exercise>, AppError> {
        let name = name.to_string();
        let exercises: Vec<Exercise> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .filter(move |q| q.field("name").eq(name.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(exercises.into_iter().next())
    }

    /// Get the whole exercise catalog, name ascending.
    ///
    /// The catalog is small (seeded entries plus custom ones); search
    /// filtering happens in memory in the catalog service.
    pub async fn list_exercises(&self) -> Result<Vec<Exercise>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store an exercise.
    pub async fn set_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXERCISES)
            .document_id(&exercise.id)
            .object(exercise)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Get a workout by ID.
    pub async fn get_workout(&self, workout_id: &str) -> Result<Option<Workout>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WORKOUTS)
            .obj()
            .one(workout_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all workouts for a user, newest first.
    ///
    /// Per-user workout counts stay small, so one fetch serves both the
    /// requested page and the total; the route slices in memory.
    pub async fn get_workouts_for_user(&self, user_id: &str) -> Result<Vec<Workout>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a workout document.
    pub async fn set_workout(&self, workout: &Workout) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WORKOUTS)
            .document_id(&workout.id)
            .object(workout)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a workout document.
    ///
    /// Entries are deleted separately via `delete_entries_for_workout`.
    pub async fn delete_workout(&self, workout_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::WORKOUTS)
            .document_id(workout_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Workout Entry Operations ────────────────────────────────

    /// Get the entries of one workout in recorded order.
    pub async fn get_entries_for_workout(
        &self,
        workout_id: &str,
    ) -> Result<Vec<WorkoutEntry>, AppError> {
        let workout_id = workout_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUT_ENTRIES)
            .filter(move |q| q.field("workoutId").eq(workout_id.clone()))
            .order_by([("orderIndex", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the entries of several workouts at once.
    ///
    /// Fans out one query per workout with bounded concurrency; used by the
    /// workout list endpoint.
    pub async fn get_entries_for_workouts(
        &self,
        workout_ids: &[String],
    ) -> Result<Vec<WorkoutEntry>, AppError> {
        let client = self.get_client()?;

        let results = stream::iter(workout_ids.to_vec())
            .map(|workout_id| async move {
                client
                    .fluent()
                    .select()
                    .from(collections::WORKOUT_ENTRIES)
                    .filter(move |q| q.field("workoutId").eq(workout_id.clone()))
                    .order_by([("orderIndex", firestore::FirestoreQueryDirection::Ascending)])
                    .obj::<WorkoutEntry>()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Vec<WorkoutEntry>, AppError>>>()
            .await;

        let mut entries = Vec::new();
        for result in results {
            entries.extend(result?);
        }
        Ok(entries)
    }

    /// Get the full entry history for one user and exercise, oldest first.
    ///
    /// Progress aggregation consumes this ordering directly; the
    /// previous-sets lookup scans it newest first. Ties on the same workout
    /// date break by creation time.
    pub async fn get_entries_for_exercise(
        &self,
        user_id: &str,
        exercise_id: &str,
    ) -> Result<Vec<WorkoutEntry>, AppError> {
        let user_id = user_id.to_string();
        let exercise_id = exercise_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUT_ENTRIES)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("exerciseId").eq(exercise_id.clone()),
                ])
            })
            .order_by([
                ("workoutDate", firestore::FirestoreQueryDirection::Ascending),
                ("createdAt", firestore::FirestoreQueryDirection::Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store multiple workout entries.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn batch_set_entries(&self, entries: &[WorkoutEntry]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(entries.to_vec())
            .map(|entry| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::WORKOUT_ENTRIES)
                    .document_id(&entry.id)
                    .object(&entry)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    /// Delete all entries of a workout.
    ///
    /// Returns the number of deleted entries. Workout updates rewrite the
    /// entry list wholesale, so this runs on every update and delete.
    pub async fn delete_entries_for_workout(&self, workout_id: &str) -> Result<usize, AppError> {
        let entries = self.get_entries_for_workout(workout_id).await?;

        self.batch_delete(
            &entries,
            collections::WORKOUT_ENTRIES,
            |entry: &WorkoutEntry| entry.id.clone(),
        )
        .await?;

        tracing::debug!(workout_id, count = entries.len(), "Deleted workout entries");

        Ok(entries.len())
    }

    // ─── Template Operations ─────────────────────────────────────

    /// Get a template by ID.
    pub async fn get_template(
        &self,
        template_id: &str,
    ) -> Result<Option<WorkoutTemplate>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TEMPLATES)
            .obj()
            .one(template_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all templates for a user, newest first.
    pub async fn get_templates_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<WorkoutTemplate>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TEMPLATES)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a template.
    pub async fn set_template(&self, template: &WorkoutTemplate) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TEMPLATES)
            .document_id(&template.id)
            .object(template)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a template.
    pub async fn delete_template(&self, template_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TEMPLATES)
            .document_id(template_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
