//! Superset rotation - cycles the active exercise during a logging session

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AnalyticsError, Result};

/// Minimum exercises that make a superset
const MIN_EXERCISES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersetSession {
    pub exercises: Vec<i64>,
    pub current_index: usize,
    pub group_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SupersetState {
    #[default]
    Idle,
    Active(SupersetSession),
}

/// Round-robin state machine.
///
/// Mutating methods take `&mut self`; share it across threads only behind a
/// `Mutex` so start/advance/stop stay serialized.
#[derive(Debug, Default)]
pub struct SupersetRotator {
    state: SupersetState,
}

impl SupersetRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session at the first exercise. Replaces any active session.
    pub fn start(&mut self, exercises: Vec<i64>) -> Result<&SupersetSession> {
        if exercises.len() < MIN_EXERCISES {
            return Err(AnalyticsError::InvalidArgument(format!(
                "superset needs at least {MIN_EXERCISES} exercises, got {}",
                exercises.len()
            )));
        }
        if let SupersetState::Active(previous) = &self.state {
            warn!(group_id = %previous.group_id, "Replacing active superset");
        }

        let session = SupersetSession { exercises, current_index: 0, group_id: Uuid::new_v4() };
        info!(group_id = %session.group_id, size = session.exercises.len(), "Superset started");
        self.state = SupersetState::Active(session);
        self.session().ok_or(AnalyticsError::SessionInactive)
    }

    /// Move to the next exercise (wrapping) and return its id
    pub fn advance(&mut self) -> Result<i64> {
        let SupersetState::Active(session) = &mut self.state else {
            warn!("advance() called without an active superset");
            return Err(AnalyticsError::SessionInactive);
        };
        session.current_index = (session.current_index + 1) % session.exercises.len();
        let exercise_id = session.exercises[session.current_index];
        debug!(index = session.current_index, exercise_id, "Superset advanced");
        Ok(exercise_id)
    }

    pub fn current_exercise_id(&self) -> Option<i64> {
        self.session().map(|s| s.exercises[s.current_index])
    }

    /// Position of an exercise within the session; `None` when it is not part of it
    pub fn order_index_of(&self, exercise_id: i64) -> Option<usize> {
        self.session()?.exercises.iter().position(|&id| id == exercise_id)
    }

    pub fn stop(&mut self) {
        if let SupersetState::Active(session) = &self.state {
            info!(group_id = %session.group_id, "Superset stopped");
        }
        self.state = SupersetState::Idle;
    }

    pub fn session(&self) -> Option<&SupersetSession> {
        match &self.state {
            SupersetState::Active(session) => Some(session),
            SupersetState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SupersetState::Active(_))
    }

    pub fn state(&self) -> &SupersetState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: i64 = 11;
    const B: i64 = 22;
    const C: i64 = 33;

    #[test]
    fn test_start_requires_two_exercises() {
        let mut rotator = SupersetRotator::new();
        assert!(matches!(rotator.start(vec![]), Err(AnalyticsError::InvalidArgument(_))));
        assert!(matches!(rotator.start(vec![A]), Err(AnalyticsError::InvalidArgument(_))));
        assert!(!rotator.is_active());
    }

    #[test]
    fn test_rotation_is_circular() {
        let mut rotator = SupersetRotator::new();
        rotator.start(vec![A, B, C]).unwrap();
        assert_eq!(rotator.current_exercise_id(), Some(A));

        assert_eq!(rotator.advance().unwrap(), B);
        assert_eq!(rotator.advance().unwrap(), C);
        assert_eq!(rotator.advance().unwrap(), A);
        assert_eq!(rotator.session().unwrap().current_index, 0);
    }

    #[test]
    fn test_advance_when_idle_fails() {
        let mut rotator = SupersetRotator::new();
        assert!(matches!(rotator.advance(), Err(AnalyticsError::SessionInactive)));
        assert_eq!(rotator.current_exercise_id(), None);
    }

    #[test]
    fn test_order_index_of() {
        let mut rotator = SupersetRotator::new();
        assert_eq!(rotator.order_index_of(A), None);
        rotator.start(vec![A, B, C]).unwrap();
        assert_eq!(rotator.order_index_of(C), Some(2));
        assert_eq!(rotator.order_index_of(99), None);
    }

    #[test]
    fn test_stop_resets_to_idle() {
        let mut rotator = SupersetRotator::new();
        rotator.start(vec![A, B]).unwrap();
        rotator.advance().unwrap();
        rotator.stop();
        assert_eq!(rotator.state(), &SupersetState::Idle);
        assert!(rotator.advance().is_err());
    }

    #[test]
    fn test_restart_gets_fresh_group() {
        let mut rotator = SupersetRotator::new();
        let first = rotator.start(vec![A, B]).unwrap().group_id;
        rotator.advance().unwrap();
        let second = rotator.start(vec![B, C]).unwrap().clone();
        assert_ne!(first, second.group_id);
        assert_eq!(second.current_index, 0);
        assert_eq!(rotator.current_exercise_id(), Some(B));
    }
}
