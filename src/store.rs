//! Logged-set value types and the read-only query primitives the
//! analytics engine needs from storage

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::StoreError;

/// One logged set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetRecord {
    pub id: Option<i64>,
    pub exercise_id: i64,
    pub workout_id: i64,
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub rpe: Option<f32>,
    pub is_warmup: bool,
    pub is_complete: bool,
    pub timestamp: DateTime<Utc>,
}

impl SetRecord {
    /// Complete, non-warmup, with weight and reps recorded
    pub fn is_working(&self) -> bool {
        self.is_complete && !self.is_warmup && self.weight.is_some() && self.reps.is_some()
    }

    /// weight * reps, when both are present
    pub fn volume(&self) -> Option<f64> {
        Some(self.weight? * f64::from(self.reps?))
    }
}

/// Set joined with its exercise metadata
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSet {
    pub set: SetRecord,
    pub exercise_name: String,
    pub target_muscle: String,
}

/// Summed working-set volume of one local day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyVolumePoint {
    pub date: NaiveDate,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuscleLastTrained {
    pub muscle: String,
    pub last_trained: DateTime<Utc>,
}

/// Best weight lifted for a rep count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalBestEntry {
    pub reps: u32,
    pub max_weight: f64,
    pub first_achieved: DateTime<Utc>,
}

/// Storage collaborator.
///
/// Volumes are sums of `weight * reps` over working sets (complete,
/// non-warmup, weight and reps present). Ranges are `[start, end)`.
pub trait WorkoutStore {
    fn sum_volume_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64, StoreError>;

    fn sum_volume_for_workout(&self, workout_id: i64) -> Result<f64, StoreError>;

    /// One point per local day with at least one working set, oldest first
    fn daily_volume_history(&self) -> Result<Vec<DailyVolumePoint>, StoreError>;

    fn last_trained_per_muscle(&self) -> Result<Vec<MuscleLastTrained>, StoreError>;

    fn working_sets_for_exercise(&self, exercise_id: i64) -> Result<Vec<SetRecord>, StoreError>;

    /// Working sets joined with exercise metadata; `None` means every exercise
    fn sets_in_range(
        &self,
        exercise_id: Option<i64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TrendSet>, StoreError>;

    /// rep count -> heaviest weight lifted for it and when it was first lifted
    fn personal_bests_with_timestamps(&self, exercise_id: i64) -> Result<BTreeMap<u32, PersonalBestEntry>, StoreError>;

    fn workout_dates_with_working_sets(&self) -> Result<Vec<NaiveDate>, StoreError>;

    /// Distinct workouts with a working set since `year_start`
    fn year_to_date_workout_count(&self, year_start: DateTime<Utc>) -> Result<u32, StoreError>;

    fn best_streak(&self) -> Result<u32, StoreError>;

    /// Write-back owned by the collaborator. Returns true when the candidate
    /// replaced the stored best.
    fn update_best_streak_if_needed(&self, candidate: u32) -> Result<bool, StoreError>;
}

/// In-memory store for analytics tests
#[cfg(test)]
pub mod fake {
    use std::cell::Cell;

    use super::*;
    use crate::calendar::Calendar;

    #[derive(Default)]
    pub struct FakeStore {
        pub sets: Vec<TrendSet>,
        pub best_streak: Cell<u32>,
        /// When set, every query fails
        pub offline: bool,
        pub calendar: Calendar,
    }

    impl FakeStore {
        pub fn with_sets(sets: Vec<TrendSet>) -> Self {
            Self { sets, ..Self::default() }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.offline {
                Err(StoreError::Unavailable("fake store offline".to_string()))
            } else {
                Ok(())
            }
        }

        fn working(&self) -> impl Iterator<Item = &TrendSet> {
            self.sets.iter().filter(|s| s.set.is_working())
        }
    }

    impl WorkoutStore for FakeStore {
        fn sum_volume_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64, StoreError> {
            self.check()?;
            Ok(self
                .working()
                .filter(|s| s.set.timestamp >= start && s.set.timestamp < end)
                .filter_map(|s| s.set.volume())
                .sum())
        }

        fn sum_volume_for_workout(&self, workout_id: i64) -> Result<f64, StoreError> {
            self.check()?;
            Ok(self.working().filter(|s| s.set.workout_id == workout_id).filter_map(|s| s.set.volume()).sum())
        }

        fn daily_volume_history(&self) -> Result<Vec<DailyVolumePoint>, StoreError> {
            self.check()?;
            let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for s in self.working() {
                *by_day.entry(self.calendar.day_of(s.set.timestamp)).or_insert(0.0) += s.set.volume().unwrap_or(0.0);
            }
            Ok(by_day.into_iter().map(|(date, volume)| DailyVolumePoint { date, volume }).collect())
        }

        fn last_trained_per_muscle(&self) -> Result<Vec<MuscleLastTrained>, StoreError> {
            self.check()?;
            let mut last: BTreeMap<&str, DateTime<Utc>> = BTreeMap::new();
            for s in self.working() {
                let entry = last.entry(s.target_muscle.as_str()).or_insert(s.set.timestamp);
                *entry = (*entry).max(s.set.timestamp);
            }
            Ok(last
                .into_iter()
                .map(|(muscle, last_trained)| MuscleLastTrained { muscle: muscle.to_string(), last_trained })
                .collect())
        }

        fn working_sets_for_exercise(&self, exercise_id: i64) -> Result<Vec<SetRecord>, StoreError> {
            self.check()?;
            Ok(self.working().filter(|s| s.set.exercise_id == exercise_id).map(|s| s.set.clone()).collect())
        }

        fn sets_in_range(
            &self,
            exercise_id: Option<i64>,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<TrendSet>, StoreError> {
            self.check()?;
            Ok(self
                .working()
                .filter(|s| exercise_id.is_none_or(|id| s.set.exercise_id == id))
                .filter(|s| s.set.timestamp >= start && s.set.timestamp < end)
                .cloned()
                .collect())
        }

        fn personal_bests_with_timestamps(&self, exercise_id: i64) -> Result<BTreeMap<u32, PersonalBestEntry>, StoreError> {
            self.check()?;
            let mut bests: BTreeMap<u32, PersonalBestEntry> = BTreeMap::new();
            for s in self.working().filter(|s| s.set.exercise_id == exercise_id) {
                let (Some(weight), Some(reps)) = (s.set.weight, s.set.reps) else { continue };
                let candidate = PersonalBestEntry { reps, max_weight: weight, first_achieved: s.set.timestamp };
                bests
                    .entry(reps)
                    .and_modify(|best| {
                        if weight > best.max_weight
                            || (weight == best.max_weight && s.set.timestamp < best.first_achieved)
                        {
                            *best = candidate.clone();
                        }
                    })
                    .or_insert_with(|| candidate.clone());
            }
            Ok(bests)
        }

        fn workout_dates_with_working_sets(&self) -> Result<Vec<NaiveDate>, StoreError> {
            Ok(self.daily_volume_history()?.into_iter().map(|p| p.date).collect())
        }

        fn year_to_date_workout_count(&self, year_start: DateTime<Utc>) -> Result<u32, StoreError> {
            self.check()?;
            let mut ids: Vec<i64> =
                self.working().filter(|s| s.set.timestamp >= year_start).map(|s| s.set.workout_id).collect();
            ids.sort_unstable();
            ids.dedup();
            Ok(ids.len() as u32)
        }

        fn best_streak(&self) -> Result<u32, StoreError> {
            self.check()?;
            Ok(self.best_streak.get())
        }

        fn update_best_streak_if_needed(&self, candidate: u32) -> Result<bool, StoreError> {
            self.check()?;
            if candidate > self.best_streak.get() {
                self.best_streak.set(candidate);
                return Ok(true);
            }
            Ok(false)
        }
    }

    /// Working set of `exercise_id` targeting `muscle`
    pub fn create_set(
        exercise_id: i64,
        workout_id: i64,
        weight: f64,
        reps: u32,
        timestamp: DateTime<Utc>,
        muscle: &str,
    ) -> TrendSet {
        TrendSet {
            set: SetRecord {
                id: None,
                exercise_id,
                workout_id,
                weight: Some(weight),
                reps: Some(reps),
                rpe: None,
                is_warmup: false,
                is_complete: true,
                timestamp,
            },
            exercise_name: format!("exercise {exercise_id}"),
            target_muscle: muscle.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::create_set;
    use chrono::TimeZone;

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 12, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_working_set_rules() {
        let set = create_set(1, 1, 100.0, 5, ts(), "chest").set;
        assert!(set.is_working());
        assert_eq!(set.volume(), Some(500.0));

        let warmup = SetRecord { is_warmup: true, ..set.clone() };
        assert!(!warmup.is_working());
        let incomplete = SetRecord { is_complete: false, ..set.clone() };
        assert!(!incomplete.is_working());
        let bodyweight = SetRecord { weight: None, ..set };
        assert!(!bodyweight.is_working());
        assert_eq!(bodyweight.volume(), None);
    }
}
