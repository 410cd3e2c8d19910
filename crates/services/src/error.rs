//! Shared error types for the services crate.

use thiserror::Error;

use solfa_core::model::{CourseError, QuestionError, QuizResultError};
use storage::repository::StorageError;

/// Errors emitted while building the course catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Course(#[from] CourseError),
}

/// Errors emitted by the quiz session and its orchestration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is not completed yet")]
    NotCompleted,
    #[error(transparent)]
    Result(#[from] QuizResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
