//! Workout template model.

use serde::{Deserialize, Serialize};

/// Saved workout template stored in Firestore.
///
/// The exercise list is embedded; templates are small and always read whole.
/// Serialized in camelCase; these documents go straight into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    /// UUID (also used as document ID)
    pub id: String,
    /// Owning user's ID
    pub user_id: String,
    /// Template name ("Push day A")
    pub name: String,
    /// Planned exercises in order
    #[serde(default)]
    pub exercises: Vec<TemplateExercise>,
    /// When this template was created (ISO 8601)
    pub created_at: String,
}

/// One planned exercise within a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    /// Exercise to perform
    pub exercise_id: String,
    /// Position within the template
    pub order_index: u32,
    /// Suggested number of sets
    pub default_sets: u32,
}
