use async_trait::async_trait;
use solfa_core::model::QuizResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for quiz results.
///
/// Results are keyed by course name with last-writer-wins semantics: saving
/// a result for a course that already has one overwrites it, so at most one
/// record exists per course name.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Fetch the stored result for a course, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no result is stored for the
    /// course, or other storage errors.
    async fn get(&self, course_name: &str) -> Result<QuizResult, StorageError>;

    /// Fetch all stored results, ordered by course name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the results cannot be read.
    async fn get_all(&self) -> Result<Vec<QuizResult>, StorageError>;

    /// Persist a result, overwriting any existing record for the same
    /// course name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn save(&self, result: &QuizResult) -> Result<(), StorageError>;

    /// Remove the stored result for a course. Missing records are not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete cannot be executed.
    async fn delete(&self, course_name: &str) -> Result<(), StorageError>;

    /// Remove all stored results.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete cannot be executed.
    async fn delete_all(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    results: Arc<Mutex<HashMap<String, QuizResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn get(&self, course_name: &str) -> Result<QuizResult, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(course_name).cloned().ok_or(StorageError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut all: Vec<QuizResult> = guard.values().cloned().collect();
        all.sort_by(|a, b| a.course_name().cmp(b.course_name()));
        Ok(all)
    }

    async fn save(&self, result: &QuizResult) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(result.course_name().to_string(), result.clone());
        Ok(())
    }

    async fn delete(&self, course_name: &str) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(course_name);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Aggregates the result repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn QuizResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let results: Arc<dyn QuizResultRepository> = Arc::new(InMemoryRepository::new());
        Self { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use solfa_core::model::{Pitch, QuestionResult};
    use solfa_core::time::fixed_now;

    fn build_result(course_name: &str, correct: bool) -> QuizResult {
        let question = QuestionResult {
            question_index: 0,
            correct_answer: vec![Pitch::Do],
            user_answer: vec![if correct { Pitch::Do } else { Pitch::Mi }],
            is_correct: correct,
            response_times_ms: vec![800],
        };
        QuizResult::finalize(
            course_name,
            vec![question],
            fixed_now(),
            fixed_now() + Duration::seconds(4),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let repo = InMemoryRepository::new();
        let result = build_result("single", true);
        repo.save(&result).await.unwrap();

        let fetched = repo.get("single").await.unwrap();
        assert_eq!(fetched, result);
    }

    #[tokio::test]
    async fn missing_course_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get("final").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn save_overwrites_by_course_name() {
        let repo = InMemoryRepository::new();
        repo.save(&build_result("single", false)).await.unwrap();
        repo.save(&build_result("single", true)).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].correct_count(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryRepository::new();
        repo.save(&build_result("basic", true)).await.unwrap();
        repo.delete("basic").await.unwrap();
        repo.delete("basic").await.unwrap();

        assert!(matches!(
            repo.get("basic").await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn delete_all_clears_every_course() {
        let repo = InMemoryRepository::new();
        repo.save(&build_result("basic", true)).await.unwrap();
        repo.save(&build_result("single", false)).await.unwrap();
        repo.delete_all().await.unwrap();

        assert!(repo.get_all().await.unwrap().is_empty());
    }
}
