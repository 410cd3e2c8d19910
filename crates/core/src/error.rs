use thiserror::Error;

use crate::model::{CourseError, PitchError, QuestionError, QuizResultError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Pitch(#[from] PitchError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    QuizResult(#[from] QuizResultError),
}
