//! crates/routine_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture: whatever owns
//! the records (a database, a seed file, a test fixture) implements them, and
//! the aggregation functions only ever see the collections they return.

use async_trait::async_trait;

use crate::domain::{Book, DailyRecord, DomainError, MealRecord, ReadingRecord, ReadingSession};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid record: {0}")]
    Invalid(#[from] DomainError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read access to the user's records.
///
/// Implementations hand out owned, already-validated records; the caller never
/// mutates shared state through this trait.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    // --- Books and Reading Sessions ---
    async fn list_books(&self) -> PortResult<Vec<Book>>;

    async fn get_book(&self, book_id: &str) -> PortResult<Book>;

    async fn list_sessions(&self) -> PortResult<Vec<ReadingSession>>;

    async fn list_sessions_for_book(&self, book_id: &str) -> PortResult<Vec<ReadingSession>>;

    // --- Routine Records ---
    async fn list_meals(&self) -> PortResult<Vec<MealRecord>>;

    async fn list_reading_records(&self) -> PortResult<Vec<ReadingRecord>>;

    async fn list_daily_records(&self) -> PortResult<Vec<DailyRecord>>;
}
