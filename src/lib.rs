//! liftlog - Personal strength training tracker
//!
//! The analytics engine turns an append-only stream of logged sets into
//! progression signals. Storage is reached only through [`store::WorkoutStore`].

pub mod analytics;
pub mod calendar;
pub mod db;
pub mod error;
pub mod exercises;
pub mod store;

pub use calendar::Calendar;
pub use db::Database;
pub use store::WorkoutStore;
