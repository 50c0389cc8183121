//! Exercise progress series for charting.
//!
//! A workout entry records effort either as per-set rows or as the legacy
//! aggregate columns from before per-set logging existed. Aggregation reads
//! whichever basis an entry actually has, tolerates partially-recorded
//! entries, and produces the same output for the same input every time.

use serde::Serialize;
use std::collections::BTreeMap;

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::workout::{SetRow, WorkoutEntry};

/// How training sessions map to chart points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPolicy {
    /// One point per calendar day; same-day sessions merge (free tier).
    DailyMerge,
    /// One point per entry, in history order (Pro).
    PerSession,
}

/// A single charted data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressPoint {
    /// UTC calendar date, "YYYY-MM-DD"
    pub date: String,
    /// Heaviest single set in the bucket
    pub weight: f64,
    /// Total repetitions
    pub reps: u32,
    /// Total volume (weight times reps, summed per set)
    pub volume: f64,
    /// Number of contributing sets
    pub sets: u32,
}

/// The basis an entry's numbers are computed from.
///
/// Decided once per entry: recorded rows win over the legacy columns even
/// when both are present and disagree.
#[derive(Debug, Clone, Copy)]
pub enum Effort<'a> {
    /// Per-set rows (non-empty).
    SetRows(&'a [SetRow]),
    /// Pre-set-row aggregate columns.
    Legacy {
        sets: Option<u32>,
        reps: Option<u32>,
        weight: Option<f64>,
    },
}

impl WorkoutEntry {
    /// The computation basis for this entry.
    pub fn effort(&self) -> Effort<'_> {
        if self.set_rows.is_empty() {
            Effort::Legacy {
                sets: self.sets,
                reps: self.reps,
                weight: self.weight,
            }
        } else {
            Effort::SetRows(&self.set_rows)
        }
    }
}

/// Per-entry contribution to a progress point.
#[derive(Debug, Clone, Copy)]
struct EntryTotals {
    weight: f64,
    reps: u32,
    volume: f64,
    sets: u32,
}

fn entry_totals(entry: &WorkoutEntry) -> EntryTotals {
    match entry.effort() {
        Effort::SetRows(rows) => {
            let mut weight: f64 = 0.0;
            let mut reps: u32 = 0;
            let mut volume: f64 = 0.0;
            for row in rows {
                let w = row.weight.unwrap_or(0.0);
                let r = row.reps.unwrap_or(0);
                weight = weight.max(w);
                reps = reps.saturating_add(r);
                volume += w * f64::from(r);
            }
            EntryTotals {
                weight,
                reps,
                volume,
                sets: rows.len() as u32,
            }
        }
        Effort::Legacy { sets, reps, weight } => {
            // Absent values default (sets to 1, the rest to 0); an explicit
            // zero stays zero.
            let set_count = sets.unwrap_or(1);
            let weight = weight.unwrap_or(0.0);
            let reps = reps.unwrap_or(0).saturating_mul(set_count);
            EntryTotals {
                weight,
                reps,
                volume: weight * f64::from(reps),
                sets: set_count,
            }
        }
    }
}

/// Compute the chartable progress series for one exercise.
///
/// `entries` must already be filtered to a single user and exercise and
/// sorted by workout date ascending (ties broken by creation time), which is
/// how the database layer returns them. Partially-recorded entries never
/// abort the computation; unrecorded numbers read as zero.
pub fn compute_progress(entries: &[WorkoutEntry], policy: ProgressPolicy) -> Vec<ProgressPoint> {
    match policy {
        ProgressPolicy::DailyMerge => {
            let mut by_date: BTreeMap<String, ProgressPoint> = BTreeMap::new();
            for entry in entries {
                let totals = entry_totals(entry);
                let key = extract_date_key(&entry.workout_date);
                match by_date.get_mut(key) {
                    Some(point) => {
                        point.weight = point.weight.max(totals.weight);
                        point.reps = point.reps.saturating_add(totals.reps);
                        point.volume += totals.volume;
                        point.sets = point.sets.saturating_add(totals.sets);
                    }
                    None => {
                        by_date.insert(key.to_string(), point_from(key, totals));
                    }
                }
            }
            // BTreeMap iterates keys ascending; for date keys that is
            // chronological order.
            by_date.into_values().collect()
        }
        ProgressPolicy::PerSession => entries
            .iter()
            .map(|entry| point_from(extract_date_key(&entry.workout_date), entry_totals(entry)))
            .collect(),
    }
}

fn point_from(date: &str, totals: EntryTotals) -> ProgressPoint {
    ProgressPoint {
        date: date.to_string(),
        weight: totals.weight,
        reps: totals.reps,
        volume: totals.volume,
        sets: totals.sets,
    }
}

/// Extract "YYYY-MM-DD" from an ISO 8601 date string.
fn extract_date_key(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}
