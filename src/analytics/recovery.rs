//! Muscle recovery status from time since last trained

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalyticsError, Result};
use crate::exercises::MuscleGroup;
use crate::store::{MuscleLastTrained, WorkoutStore};

/// `days_since` reported for a muscle with no logged sets
pub const NEVER_TRAINED_DAYS: f64 = 999.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryStatus {
    /// Trained within the last day
    Fatigued,
    /// 1 to 3 days
    Recovering,
    Fresh,
}

impl RecoveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryStatus::Fatigued => "FATIGUED",
            RecoveryStatus::Recovering => "RECOVERING",
            RecoveryStatus::Fresh => "FRESH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleRecovery {
    pub muscle: String,
    pub days_since: f64,
    pub status: RecoveryStatus,
    pub last_trained: Option<DateTime<Utc>>,
}

impl MuscleRecovery {
    pub fn is_never_trained(&self) -> bool {
        self.last_trained.is_none()
    }
}

pub struct RecoveryAnalyzer;

impl RecoveryAnalyzer {
    const FATIGUED_BELOW_DAYS: f64 = 1.0;
    const RECOVERING_BELOW_DAYS: f64 = 3.0;

    pub fn classify(days_since: f64) -> RecoveryStatus {
        if days_since < Self::FATIGUED_BELOW_DAYS {
            RecoveryStatus::Fatigued
        } else if days_since < Self::RECOVERING_BELOW_DAYS {
            RecoveryStatus::Recovering
        } else {
            RecoveryStatus::Fresh
        }
    }

    fn entry(muscle: String, last_trained: Option<DateTime<Utc>>, now: DateTime<Utc>) -> MuscleRecovery {
        let days_since = match last_trained {
            Some(ts) => (now - ts).num_milliseconds() as f64 / MILLIS_PER_DAY,
            None => NEVER_TRAINED_DAYS,
        };
        MuscleRecovery { muscle, days_since, status: Self::classify(days_since), last_trained }
    }

    /// One entry per catalog muscle (catalog order), then any logged muscle
    /// the catalog does not know. Names match case-insensitively, Unicode
    /// included.
    pub fn analyze(now: DateTime<Utc>, last_trained: &[MuscleLastTrained], catalog: &[MuscleGroup]) -> Vec<MuscleRecovery> {
        let normalized: Vec<(String, DateTime<Utc>)> =
            last_trained.iter().map(|m| (m.muscle.trim().to_lowercase(), m.last_trained)).collect();
        // `name` must already be normalized
        let latest_for = |name: &str| normalized.iter().filter(|(m, _)| m == name).map(|(_, ts)| *ts).max();

        let mut result: Vec<MuscleRecovery> = catalog
            .iter()
            .map(|muscle| Self::entry(muscle.name().to_string(), latest_for(muscle.name()), now))
            .collect();

        for (name, _) in &normalized {
            if result.iter().any(|r| &r.muscle == name) {
                continue;
            }
            let latest = latest_for(name);
            result.push(Self::entry(name.clone(), latest, now));
        }

        result
    }

    pub fn load<S: WorkoutStore + ?Sized>(store: &S, now: DateTime<Utc>) -> Result<Vec<MuscleRecovery>> {
        let last_trained = store
            .last_trained_per_muscle()
            .map_err(AnalyticsError::upstream("last_trained_per_muscle"))?;
        Ok(Self::analyze(now, &last_trained, MuscleGroup::all()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::{FakeStore, create_set};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn trained(muscle: &str, hours_ago: i64) -> MuscleLastTrained {
        MuscleLastTrained { muscle: muscle.to_string(), last_trained: now() - Duration::hours(hours_ago) }
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(RecoveryAnalyzer::classify(0.5), RecoveryStatus::Fatigued);
        assert_eq!(RecoveryAnalyzer::classify(1.0), RecoveryStatus::Recovering);
        assert_eq!(RecoveryAnalyzer::classify(2.0), RecoveryStatus::Recovering);
        assert_eq!(RecoveryAnalyzer::classify(3.0), RecoveryStatus::Fresh);
        assert_eq!(RecoveryAnalyzer::classify(5.0), RecoveryStatus::Fresh);
    }

    #[test]
    fn test_analyze_statuses() {
        let last = vec![trained("chest", 12), trained("back", 48), trained("quads", 120)];
        let result = RecoveryAnalyzer::analyze(now(), &last, MuscleGroup::all());

        let find = |name: &str| result.iter().find(|r| r.muscle == name).unwrap();
        assert_eq!(find("chest").status, RecoveryStatus::Fatigued);
        assert_eq!(find("chest").days_since, 0.5);
        assert_eq!(find("back").status, RecoveryStatus::Recovering);
        assert_eq!(find("quads").status, RecoveryStatus::Fresh);
        assert_eq!(find("quads").days_since, 5.0);
    }

    #[test]
    fn test_never_trained_is_fresh_with_sentinel() {
        let result = RecoveryAnalyzer::analyze(now(), &[], MuscleGroup::all());
        assert_eq!(result.len(), MuscleGroup::all().len());
        for r in &result {
            assert_eq!(r.status, RecoveryStatus::Fresh);
            assert_eq!(r.days_since, NEVER_TRAINED_DAYS);
            assert!(r.is_never_trained());
        }
    }

    #[test]
    fn test_long_ago_distinct_from_never() {
        let result = RecoveryAnalyzer::analyze(now(), &[trained("calves", 24 * 30)], &[MuscleGroup::Calves]);
        assert_eq!(result[0].status, RecoveryStatus::Fresh);
        assert_eq!(result[0].days_since, 30.0);
        assert!(!result[0].is_never_trained());
    }

    #[test]
    fn test_unknown_muscle_appended_and_case_insensitive() {
        let last = vec![trained("Chest", 2), trained("neck", 30)];
        let result = RecoveryAnalyzer::analyze(now(), &last, &[MuscleGroup::Chest, MuscleGroup::Back]);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].muscle, "chest");
        assert_eq!(result[0].status, RecoveryStatus::Fatigued);
        assert_eq!(result[1].days_since, NEVER_TRAINED_DAYS);
        assert_eq!(result[2].muscle, "neck");
        assert_eq!(result[2].status, RecoveryStatus::Recovering);
    }

    #[test]
    fn test_non_ascii_muscle_keeps_its_timestamp() {
        let last = vec![trained("Шея", 12), trained("шея", 30)];
        let result = RecoveryAnalyzer::analyze(now(), &last, &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].muscle, "шея");
        assert_eq!(result[0].status, RecoveryStatus::Fatigued);
        assert_eq!(result[0].days_since, 0.5);
        assert_eq!(result[0].last_trained, Some(now() - Duration::hours(12)));
    }

    #[test]
    fn test_status_serializes_as_label() {
        for status in [RecoveryStatus::Fatigued, RecoveryStatus::Recovering, RecoveryStatus::Fresh] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.label());
        }
    }

    #[test]
    fn test_load_from_store() {
        let store = FakeStore::with_sets(vec![create_set(1, 1, 100.0, 5, now() - Duration::hours(6), "chest")]);
        let result = RecoveryAnalyzer::load(&store, now()).unwrap();
        assert_eq!(result.len(), MuscleGroup::all().len());
        assert_eq!(result[0].status, RecoveryStatus::Fatigued);
    }
}
