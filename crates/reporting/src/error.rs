//! Reporting error types.

use thiserror::Error;

/// Errors that can occur on the reporting side.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// Failed to deserialize an event payload.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An expense entry was rejected.
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportingError>;
