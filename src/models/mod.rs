// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod exercise;
pub mod progress;
pub mod template;
pub mod user;
pub mod workout;

pub use exercise::{Exercise, ExerciseFilter};
pub use progress::{compute_progress, ProgressPoint, ProgressPolicy};
pub use template::{TemplateExercise, WorkoutTemplate};
pub use user::User;
pub use workout::{derive_legacy_summary, LegacySummary, SetRow, Workout, WorkoutEntry};
