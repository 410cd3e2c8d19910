use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::pitch::Pitch;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },

    #[error("total questions ({total}) does not match question list length ({actual})")]
    TotalMismatch { total: u32, actual: usize },

    #[error("correct count ({declared}) does not match graded results ({counted})")]
    CorrectCountMismatch { declared: u32, counted: u32 },
}

//
// ─── QUESTION RESULT ──────────────────────────────────────────────────────────
//

/// Record of one graded question.
///
/// `user_answer` may be shorter than `correct_answer` when the question timed
/// out. `response_times_ms` holds one latency sample per submitted pitch: the
/// first is measured from question start, later ones from the previous
/// submission. Samples recorded before a timeout are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_index: u32,
    pub correct_answer: Vec<Pitch>,
    pub user_answer: Vec<Pitch>,
    pub is_correct: bool,
    pub response_times_ms: Vec<u64>,
}

impl QuestionResult {
    /// First-response latency for this question, if any pitch was submitted.
    #[must_use]
    pub fn first_response_ms(&self) -> Option<u64> {
        self.response_times_ms.first().copied()
    }
}

//
// ─── QUIZ RESULT ──────────────────────────────────────────────────────────────
//

/// Aggregate record for one completed run through a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    course_name: String,
    completed_at: DateTime<Utc>,
    total_questions: u32,
    correct_count: u32,
    questions: Vec<QuestionResult>,
    average_response_time_ms: u64,
    total_time_ms: u64,
}

impl QuizResult {
    /// Aggregate a finished session's per-question results into a result
    /// record.
    ///
    /// The average is the arithmetic mean of each question's first latency
    /// sample, rounded to the nearest millisecond; questions with no samples
    /// (for example an empty timed-out answer) do not contribute, and the
    /// average is `0` when no question has a sample.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::InvalidTimeRange` if `completed_at` is
    /// before `started_at`, or `QuizResultError::TooManyQuestions` if the
    /// question count cannot fit in `u32`.
    pub fn finalize(
        course_name: impl Into<String>,
        questions: Vec<QuestionResult>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if completed_at < started_at {
            return Err(QuizResultError::InvalidTimeRange);
        }
        let total_questions = u32::try_from(questions.len())
            .map_err(|_| QuizResultError::TooManyQuestions {
                len: questions.len(),
            })?;

        let correct_count = questions.iter().filter(|q| q.is_correct).count() as u32;

        let first_samples: Vec<u64> = questions
            .iter()
            .filter_map(QuestionResult::first_response_ms)
            .collect();
        let average_response_time_ms = if first_samples.is_empty() {
            0
        } else {
            let sum: u64 = first_samples.iter().sum();
            let n = first_samples.len() as u64;
            (sum + n / 2) / n
        };

        let total_time_ms =
            u64::try_from((completed_at - started_at).num_milliseconds()).unwrap_or(0);

        Ok(Self {
            course_name: course_name.into(),
            completed_at,
            total_questions,
            correct_count,
            questions,
            average_response_time_ms,
            total_time_ms,
        })
    }

    /// Rehydrate a quiz result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` when the persisted counts do not align with
    /// the question list.
    pub fn from_persisted(
        course_name: impl Into<String>,
        completed_at: DateTime<Utc>,
        total_questions: u32,
        correct_count: u32,
        questions: Vec<QuestionResult>,
        average_response_time_ms: u64,
        total_time_ms: u64,
    ) -> Result<Self, QuizResultError> {
        if total_questions as usize != questions.len() {
            return Err(QuizResultError::TotalMismatch {
                total: total_questions,
                actual: questions.len(),
            });
        }
        let counted = questions.iter().filter(|q| q.is_correct).count() as u32;
        if counted != correct_count {
            return Err(QuizResultError::CorrectCountMismatch {
                declared: correct_count,
                counted,
            });
        }

        Ok(Self {
            course_name: course_name.into(),
            completed_at,
            total_questions,
            correct_count,
            questions,
            average_response_time_ms,
            total_time_ms,
        })
    }

    #[must_use]
    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionResult] {
        &self.questions
    }

    #[must_use]
    pub fn average_response_time_ms(&self) -> u64 {
        self.average_response_time_ms
    }

    #[must_use]
    pub fn total_time_ms(&self) -> u64 {
        self.total_time_ms
    }

    /// Accuracy in percent, rounded to the nearest integer. `0` for an empty
    /// course.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let scaled = u64::from(self.correct_count) * 100 + u64::from(self.total_questions) / 2;
        (scaled / u64::from(self.total_questions)) as u32
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
