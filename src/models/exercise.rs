//! Exercise catalog model.

use serde::{Deserialize, Serialize};

/// Exercise catalog entry stored in Firestore.
///
/// Entries are immutable once created, so by-ID caching never goes stale.
/// Serialized in camelCase; these documents go straight into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// UUID (also used as document ID)
    pub id: String,
    /// Display name, unique within the catalog
    pub name: String,
    /// Optional description / form cues
    pub description: Option<String>,
    /// Primary muscle group ("Chest", "Back", ...)
    pub muscle_group: Option<String>,
    /// Equipment required ("Barbell", "Bodyweight", ...)
    pub equipment: Option<String>,
    /// Whether a user created this rather than the seed catalog
    #[serde(default)]
    pub is_custom: bool,
    /// Creating user's ID for custom exercises
    pub created_by: Option<String>,
    /// When this entry was created (ISO 8601)
    pub created_at: String,
}

/// Search filters for the catalog list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    /// Case-insensitive substring match on the name
    pub query: Option<String>,
    /// Exact muscle group
    pub muscle_group: Option<String>,
    /// Exact equipment
    pub equipment: Option<String>,
}

impl Exercise {
    /// Whether this entry passes the given search filters.
    pub fn matches(&self, filter: &ExerciseFilter) -> bool {
        if let Some(q) = &filter.query {
            if !self.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(muscle_group) = &filter.muscle_group {
            if self.muscle_group.as_deref() != Some(muscle_group.as_str()) {
                return false;
            }
        }
        if let Some(equipment) = &filter.equipment {
            if self.equipment.as_deref() != Some(equipment.as_str()) {
                return false;
            }
        }
        true
    }
}
