//! Error types for the analytics engine and its storage collaborator

use thiserror::Error;

/// Errors raised by a [`WorkoutStore`](crate::store::WorkoutStore) implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite query failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored value could not be decoded
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Store is not reachable right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by analytics components
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Caller passed an argument the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Superset command issued while no session is active
    #[error("No active superset session")]
    SessionInactive,

    /// External store could not answer a query
    #[error("Query `{query}` failed: {source}")]
    UpstreamQuery {
        query: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AnalyticsError {
    /// Wrap a store failure, tagging it with the query that produced it
    pub fn upstream(query: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| {
            tracing::warn!(query, error = %source, "Upstream query failed");
            AnalyticsError::UpstreamQuery { query, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
