//! Analytics module - progression signals derived from logged sets
//!
//! Features:
//! - Estimated one-rep and ten-rep maxima
//! - Personal records with a rep-count Pareto frontier
//! - Superset rotation during a logging session
//! - Weekly volume progress with a one-shot overflow signal
//! - Consistency heat map, score and streaks
//! - Muscle recovery status
//! - Volume / E1RM trends

pub mod consistency;
pub mod one_rep_max;
pub mod personal_records;
pub mod recovery;
pub mod superset;
pub mod trend;
pub mod weekly_volume;

pub use consistency::{ConsistencyAnalyzer, ConsistencyReport};
pub use one_rep_max::{estimate_e10rm, estimate_e1rm};
pub use personal_records::PersonalRecords;
pub use recovery::{RecoveryAnalyzer, RecoveryStatus};
pub use superset::SupersetRotator;
pub use trend::{TrendAggregator, TrendInterval, TrendMetric, TrendPeriod};
pub use weekly_volume::{WeeklyVolumeState, WeeklyVolumeTracker};
