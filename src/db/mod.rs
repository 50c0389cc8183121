//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EXERCISES: &str = "exercises";
    pub const WORKOUTS: &str = "workouts";
    /// Workout-exercise join records (denormalized for progress queries)
    pub const WORKOUT_ENTRIES: &str = "workout_entries";
    pub const TEMPLATES: &str = "templates";
}
