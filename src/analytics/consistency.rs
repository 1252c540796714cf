//! Training consistency: year heat map, weekly consistency score, streaks

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::calendar::Calendar;
use crate::error::{AnalyticsError, Result};
use crate::store::{DailyVolumePoint, WorkoutStore};

/// One day of the heat map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatMapCell {
    pub date: NaiveDate,
    pub volume: f64,
    /// 0 = rest day, 1..=3 = tercile of the non-zero days
    pub level: u8,
}

/// Percentile cut points used to level the heat map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelThresholds {
    pub p33: f64,
    pub p66: f64,
}

impl LevelThresholds {
    pub fn level(&self, volume: f64) -> u8 {
        if !(volume > 0.0) {
            0
        } else if volume <= self.p33 {
            1
        } else if volume <= self.p66 {
            2
        } else {
            3
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMap {
    /// Oldest first, today last
    pub cells: Vec<HeatMapCell>,
    /// `None` when the window holds no training day
    pub thresholds: Option<LevelThresholds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub heat_map: HeatMap,
    /// 0..=100
    pub score: u32,
    pub active_weeks: u32,
    pub year_to_date_workouts: u32,
    pub year_to_date_volume: f64,
    pub current_streak: u32,
    /// max(stored best, current streak)
    pub best_streak: u32,
    /// Current streak beats the stored best; caller should write it back
    pub is_new_best_streak: bool,
}

/// Consistency analytics over the daily volume history
pub struct ConsistencyAnalyzer;

impl ConsistencyAnalyzer {
    /// Days shown in the heat map, today included
    pub const HEAT_MAP_DAYS: usize = 365;

    /// Trailing weeks counted by the score, current week included
    pub const SCORE_WEEKS: u32 = 52;

    const LOW_PERCENTILE: f64 = 33.0;
    const HIGH_PERCENTILE: f64 = 66.0;

    /// Nearest-rank percentile of an ascending slice: the value at
    /// 1-based rank `ceil(p / 100 * n)`, clamped to `1..=n`.
    pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
        if sorted.is_empty() {
            return None;
        }
        let n = sorted.len();
        let rank = ((p / 100.0) * n as f64).ceil() as usize;
        Some(sorted[rank.clamp(1, n) - 1])
    }

    /// Build the 365-day heat map ending at `today`
    pub fn heat_map(history: &[DailyVolumePoint], today: NaiveDate) -> HeatMap {
        let first_day = today - Duration::days(Self::HEAT_MAP_DAYS as i64 - 1);

        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for point in history.iter().filter(|p| p.date >= first_day && p.date <= today) {
            *by_day.entry(point.date).or_insert(0.0) += point.volume;
        }

        let mut non_zero: Vec<f64> = by_day.values().copied().filter(|v| *v > 0.0).collect();
        non_zero.sort_by(f64::total_cmp);

        let thresholds = match (
            Self::percentile(&non_zero, Self::LOW_PERCENTILE),
            Self::percentile(&non_zero, Self::HIGH_PERCENTILE),
        ) {
            (Some(p33), Some(p66)) => Some(LevelThresholds { p33, p66 }),
            _ => None,
        };

        let cells = first_day
            .iter_days()
            .take(Self::HEAT_MAP_DAYS)
            .map(|date| {
                let volume = by_day.get(&date).copied().unwrap_or(0.0);
                let level = thresholds.map_or(0, |t| t.level(volume));
                HeatMapCell { date, volume, level }
            })
            .collect();

        HeatMap { cells, thresholds }
    }

    /// Score from distinct ISO weeks with volume among the trailing 52.
    /// Returns `(score, active_weeks)`.
    pub fn consistency_score(history: &[DailyVolumePoint], today: NaiveDate) -> (u32, u32) {
        let this_week = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let earliest = this_week - Duration::weeks(i64::from(Self::SCORE_WEEKS) - 1);

        let active: BTreeSet<(i32, u32)> = history
            .iter()
            .filter(|p| p.volume > 0.0 && p.date >= earliest && p.date <= today)
            .map(|p| {
                let week = p.date.iso_week();
                (week.year(), week.week())
            })
            .collect();

        let active_weeks = active.len() as u32;
        let score = (f64::from(active_weeks) / f64::from(Self::SCORE_WEEKS) * 100.0).round();
        (score.clamp(0.0, 100.0) as u32, active_weeks)
    }

    /// Consecutive training days ending today, or yesterday when today
    /// has no session yet.
    pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
        let days: HashSet<NaiveDate> = dates.iter().copied().collect();
        let mut day = if days.contains(&today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) if days.contains(&yesterday) => yesterday,
                _ => return 0,
            }
        };

        let mut streak = 0;
        while days.contains(&day) {
            streak += 1;
            match day.pred_opt() {
                Some(previous) => day = previous,
                None => break,
            }
        }
        streak
    }

    /// Full report for the consistency screen
    pub fn analyze<S: WorkoutStore + ?Sized>(
        store: &S,
        calendar: &Calendar,
        now: DateTime<Utc>,
    ) -> Result<ConsistencyReport> {
        let today = calendar.day_of(now);
        let year_start = calendar.start_of_year(now);

        let history = store
            .daily_volume_history()
            .map_err(AnalyticsError::upstream("daily_volume_history"))?;
        let dates = store
            .workout_dates_with_working_sets()
            .map_err(AnalyticsError::upstream("workout_dates_with_working_sets"))?;
        let year_to_date_workouts = store
            .year_to_date_workout_count(year_start)
            .map_err(AnalyticsError::upstream("year_to_date_workout_count"))?;
        let year_to_date_volume = store
            .sum_volume_in_range(year_start, now + Duration::milliseconds(1))
            .map_err(AnalyticsError::upstream("sum_volume_in_range"))?;
        let stored_best = store.best_streak().map_err(AnalyticsError::upstream("best_streak"))?;

        let heat_map = Self::heat_map(&history, today);
        let (score, active_weeks) = Self::consistency_score(&history, today);
        let current_streak = Self::current_streak(&dates, today);

        debug!(score, active_weeks, current_streak, "Consistency analyzed");

        Ok(ConsistencyReport {
            heat_map,
            score,
            active_weeks,
            year_to_date_workouts,
            year_to_date_volume,
            current_streak,
            best_streak: stored_best.max(current_streak),
            is_new_best_streak: current_streak > stored_best,
        })
    }
}
