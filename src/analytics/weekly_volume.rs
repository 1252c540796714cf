//! Weekly volume progress with a one-shot "overflow" celebration signal
//!
//! Compares the current calendar week's working-set volume against the
//! whole previous week. When the current week passes last week for the
//! first time, `just_overflowed` is raised exactly once for that episode.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::calendar::Calendar;
use crate::error::{AnalyticsError, Result};
use crate::store::WorkoutStore;

/// Snapshot published after every refresh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolumeState {
    pub last_week_volume: f64,
    pub current_week_volume: f64,
    /// current / last; 0 in a first week, may exceed 1.0
    pub progress_ratio: f64,
    pub is_first_week: bool,
    pub has_overflowed: bool,
    pub just_overflowed: bool,
}

impl Default for WeeklyVolumeState {
    fn default() -> Self {
        Self {
            last_week_volume: 0.0,
            current_week_volume: 0.0,
            progress_ratio: 0.0,
            is_first_week: true,
            has_overflowed: false,
            just_overflowed: false,
        }
    }
}

impl WeeklyVolumeState {
    /// Compute the volume comparison; `just_overflowed` is left for the tracker
    fn compute(last_week_volume: f64, current_week_volume: f64) -> Self {
        let is_first_week = !(last_week_volume > 0.0);
        let progress_ratio = if is_first_week { 0.0 } else { current_week_volume / last_week_volume };
        Self {
            last_week_volume,
            current_week_volume,
            progress_ratio,
            is_first_week,
            has_overflowed: !is_first_week && current_week_volume > last_week_volume,
            just_overflowed: false,
        }
    }
}

/// Persistable tracker state, including the celebration latch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerCheckpoint {
    pub state: WeeklyVolumeState,
    pub overflow_celebration_triggered: bool,
    pub last_week_start: Option<NaiveDate>,
}

/// Stateful weekly tracker.
///
/// Single writer: `refresh` and `clear_overflow_animation` take `&mut self`.
/// Readers hold a [`watch::Receiver`] from [`subscribe`](Self::subscribe) and
/// always see a complete snapshot.
pub struct WeeklyVolumeTracker {
    calendar: Calendar,
    state: WeeklyVolumeState,
    overflow_celebration_triggered: bool,
    last_week_start: Option<NaiveDate>,
    tx: watch::Sender<WeeklyVolumeState>,
}

impl WeeklyVolumeTracker {
    pub fn new(calendar: Calendar) -> Self {
        Self::from_checkpoint(calendar, TrackerCheckpoint::default())
    }

    /// Restore a tracker saved with [`checkpoint`](Self::checkpoint)
    pub fn from_checkpoint(calendar: Calendar, checkpoint: TrackerCheckpoint) -> Self {
        let (tx, _rx) = watch::channel(checkpoint.state);
        Self {
            calendar,
            state: checkpoint.state,
            overflow_celebration_triggered: checkpoint.overflow_celebration_triggered,
            last_week_start: checkpoint.last_week_start,
            tx,
        }
    }

    pub fn checkpoint(&self) -> TrackerCheckpoint {
        TrackerCheckpoint {
            state: self.state,
            overflow_celebration_triggered: self.overflow_celebration_triggered,
            last_week_start: self.last_week_start,
        }
    }

    pub fn state(&self) -> WeeklyVolumeState {
        self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<WeeklyVolumeState> {
        self.tx.subscribe()
    }

    /// Recompute from the store.
    ///
    /// Both volume queries run before any field is touched, so a store
    /// failure leaves the previous snapshot in place.
    pub fn refresh<S: WorkoutStore + ?Sized>(&mut self, store: &S, now: DateTime<Utc>) -> Result<WeeklyVolumeState> {
        let week_start = self.calendar.week_start(self.calendar.day_of(now));
        let last_week_start = week_start - Duration::weeks(1);
        let this_week_begins = self.calendar.start_of_day(week_start);
        let last_week_begins = self.calendar.start_of_day(last_week_start);

        let last_week_volume = store
            .sum_volume_in_range(last_week_begins, this_week_begins)
            .map_err(AnalyticsError::upstream("sum_volume_in_range"))?;
        let current_week_volume = store
            .sum_volume_in_range(this_week_begins, now + Duration::milliseconds(1))
            .map_err(AnalyticsError::upstream("sum_volume_in_range"))?;

        let mut triggered = self.overflow_celebration_triggered;
        match self.last_week_start {
            Some(previous) if previous == last_week_start => {}
            Some(previous) if last_week_start - previous == Duration::weeks(1) => {
                debug!(%last_week_start, "New week, overflow episode reset");
                triggered = false;
            }
            previous => {
                debug!(?previous, %last_week_start, "Week boundary jumped, overflow episode reset");
                triggered = false;
            }
        }

        let mut state = WeeklyVolumeState::compute(last_week_volume, current_week_volume);
        if state.has_overflowed && !triggered {
            state.just_overflowed = true;
            triggered = true;
            info!(
                last_week = last_week_volume,
                current_week = current_week_volume,
                "Weekly volume overflowed"
            );
        }

        self.state = state;
        self.overflow_celebration_triggered = triggered;
        self.last_week_start = Some(last_week_start);
        self.tx.send_replace(state);

        debug!(ratio = state.progress_ratio, first_week = state.is_first_week, "Weekly volume refreshed");
        Ok(state)
    }

    /// Drop `just_overflowed` once the celebration has been shown
    pub fn clear_overflow_animation(&mut self) {
        if self.state.just_overflowed {
            self.state.just_overflowed = false;
            self.tx.send_replace(self.state);
        }
    }

    /// Volume one workout contributed; independent of the weekly state
    pub fn session_contribution<S: WorkoutStore + ?Sized>(store: &S, workout_id: i64) -> Result<f64> {
        store
            .sum_volume_for_workout(workout_id)
            .map_err(AnalyticsError::upstream("sum_volume_for_workout"))
    }
}
