//! Time series of volume or estimated 1RM, bucketed by workout, day or week

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use super::one_rep_max::estimate_e1rm;
use crate::calendar::Calendar;
use crate::error::{AnalyticsError, Result};
use crate::store::{TrendSet, WorkoutStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Sum of weight x reps
    Volume,
    /// Best single-set estimated 1RM
    E1rm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendInterval {
    Workout,
    Day,
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPeriod {
    Month,
    Quarter,
    HalfYear,
    Year,
    All,
}

impl TrendPeriod {
    /// Query window `[start, end)` ending just after `now`
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = now + Duration::milliseconds(1);
        let start = match self {
            TrendPeriod::Month => now - Duration::days(30),
            TrendPeriod::Quarter => now - Duration::days(91),
            TrendPeriod::HalfYear => now - Duration::days(182),
            TrendPeriod::Year => now - Duration::days(365),
            TrendPeriod::All => DateTime::<Utc>::MIN_UTC,
        };
        (start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub bucket_start: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
enum BucketKey {
    Workout(i64),
    Period(DateTime<Utc>),
}

pub struct TrendAggregator;

impl TrendAggregator {
    fn key(calendar: &Calendar, interval: TrendInterval, set: &TrendSet) -> BucketKey {
        match interval {
            TrendInterval::Workout => BucketKey::Workout(set.set.workout_id),
            TrendInterval::Day => BucketKey::Period(calendar.start_of_day(calendar.day_of(set.set.timestamp))),
            TrendInterval::Week => BucketKey::Period(calendar.start_of_week(set.set.timestamp)),
        }
    }

    /// Bucket working sets and reduce each bucket to one point.
    ///
    /// Non-working sets are skipped. Empty buckets never appear; a caller
    /// that needs a continuous axis fills the gaps itself.
    pub fn aggregate(sets: &[TrendSet], metric: TrendMetric, interval: TrendInterval, calendar: &Calendar) -> Vec<TrendPoint> {
        // (bucket start, workout id or 0) -> value
        let mut buckets: BTreeMap<(DateTime<Utc>, i64), f64> = BTreeMap::new();
        let mut workout_starts: BTreeMap<i64, DateTime<Utc>> = BTreeMap::new();

        for s in sets.iter().filter(|s| s.set.is_working()) {
            if let BucketKey::Workout(id) = Self::key(calendar, interval, s) {
                let start = workout_starts.entry(id).or_insert(s.set.timestamp);
                *start = (*start).min(s.set.timestamp);
            }
        }

        for s in sets.iter().filter(|s| s.set.is_working()) {
            let (Some(weight), Some(reps)) = (s.set.weight, s.set.reps) else { continue };
            let sort_key = match Self::key(calendar, interval, s) {
                BucketKey::Workout(id) => (workout_starts.get(&id).copied().unwrap_or(s.set.timestamp), id),
                BucketKey::Period(start) => (start, 0),
            };

            match metric {
                TrendMetric::Volume => {
                    *buckets.entry(sort_key).or_insert(0.0) += weight * f64::from(reps);
                }
                TrendMetric::E1rm => {
                    let Some(estimate) = estimate_e1rm(weight, reps) else { continue };
                    let best = buckets.entry(sort_key).or_insert(estimate);
                    *best = best.max(estimate);
                }
            }
        }

        buckets
            .into_iter()
            .map(|((bucket_start, _), value)| TrendPoint { bucket_start, value })
            .collect()
    }

    /// Query the period's sets and aggregate them
    pub fn load<S: WorkoutStore + ?Sized>(
        store: &S,
        calendar: &Calendar,
        exercise_id: Option<i64>,
        period: TrendPeriod,
        metric: TrendMetric,
        interval: TrendInterval,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>> {
        let (start, end) = period.range(now);
        let sets = store
            .sets_in_range(exercise_id, start, end)
            .map_err(AnalyticsError::upstream("sets_in_range"))?;
        let points = Self::aggregate(&sets, metric, interval, calendar);
        debug!(sets = sets.len(), points = points.len(), ?metric, ?interval, "Trend aggregated");
        Ok(points)
    }
}
