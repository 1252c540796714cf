//! Personal records: heaviest set, best estimated maxima, rep-count frontier

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::one_rep_max::{estimate_e10rm, estimate_e1rm};
use crate::error::{AnalyticsError, Result};
use crate::store::{PersonalBestEntry, SetRecord, WorkoutStore};

/// A set together with the estimate it produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatedBest {
    pub set: SetRecord,
    pub estimate: f64,
}

/// Records for one exercise
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonalRecords {
    pub heaviest: Option<SetRecord>,
    pub best_e1rm: Option<EstimatedBest>,
    pub best_e10rm: Option<EstimatedBest>,
    /// Pareto frontier keyed by rep count
    pub rep_records: BTreeMap<u32, PersonalBestEntry>,
}

impl PersonalRecords {
    /// True when a set of `weight x reps` would enter the frontier:
    /// no current record matches or beats it on both axes.
    pub fn is_new_record(&self, weight: f64, reps: u32) -> bool {
        if !(weight > 0.0) || reps == 0 {
            return false;
        }
        !self.rep_records.values().any(|r| r.reps >= reps && r.max_weight >= weight)
    }
}

/// Working set with the maximum weight; ties go to the earliest set
pub fn heaviest_weight(sets: &[SetRecord]) -> Option<SetRecord> {
    let mut best: Option<(&SetRecord, f64)> = None;
    for set in sets.iter().filter(|s| s.is_working()) {
        let Some(weight) = set.weight else { continue };
        let better = match best {
            None => true,
            Some((current, w)) => weight > w || (weight == w && set.timestamp < current.timestamp),
        };
        if better {
            best = Some((set, weight));
        }
    }
    best.map(|(set, _)| set.clone())
}

fn best_by(sets: &[SetRecord], estimator: fn(f64, u32) -> Option<f64>) -> Option<EstimatedBest> {
    let mut best: Option<(&SetRecord, f64)> = None;
    for set in sets.iter().filter(|s| s.is_working()) {
        let (Some(weight), Some(reps)) = (set.weight, set.reps) else { continue };
        let Some(estimate) = estimator(weight, reps) else { continue };
        let better = match best {
            None => true,
            Some((current, e)) => estimate > e || (estimate == e && set.timestamp < current.timestamp),
        };
        if better {
            best = Some((set, estimate));
        }
    }
    best.map(|(set, estimate)| EstimatedBest { set: set.clone(), estimate })
}

pub fn best_e1rm(sets: &[SetRecord]) -> Option<EstimatedBest> {
    best_by(sets, estimate_e1rm)
}

pub fn best_e10rm(sets: &[SetRecord]) -> Option<EstimatedBest> {
    best_by(sets, estimate_e10rm)
}

/// `b` dominates `a`: at least as good on reps and weight, strictly better on one
fn dominates(b: &PersonalBestEntry, a: &PersonalBestEntry) -> bool {
    b.reps >= a.reps
        && b.max_weight >= a.max_weight
        && (b.reps > a.reps || b.max_weight > a.max_weight)
}

/// Keep only entries not dominated by any other entry.
///
/// Pairwise O(n²); rep counts rarely exceed a few dozen.
pub fn dominance_filter(records: &BTreeMap<u32, PersonalBestEntry>) -> BTreeMap<u32, PersonalBestEntry> {
    records
        .iter()
        .filter(|(_, entry)| !records.values().any(|other| dominates(other, entry)))
        .map(|(reps, entry)| (*reps, entry.clone()))
        .collect()
}

/// Combine working sets and per-rep bests into the record summary
pub fn aggregate(sets: &[SetRecord], bests: &BTreeMap<u32, PersonalBestEntry>) -> PersonalRecords {
    let rep_records = dominance_filter(bests);
    debug!(candidates = bests.len(), frontier = rep_records.len(), "Rep records filtered");
    PersonalRecords {
        heaviest: heaviest_weight(sets),
        best_e1rm: best_e1rm(sets),
        best_e10rm: best_e10rm(sets),
        rep_records,
    }
}

/// Query the store and aggregate records for one exercise
pub fn load<S: WorkoutStore + ?Sized>(store: &S, exercise_id: i64) -> Result<PersonalRecords> {
    let sets = store
        .working_sets_for_exercise(exercise_id)
        .map_err(AnalyticsError::upstream("working_sets_for_exercise"))?;
    let bests = store
        .personal_bests_with_timestamps(exercise_id)
        .map_err(AnalyticsError::upstream("personal_bests_with_timestamps"))?;
    Ok(aggregate(&sets, &bests))
}
