mod course;
mod pitch;
mod question;
mod result;

pub use course::{Course, CourseError, CourseId, PRACTICE_TEST_LIMIT_MS, TimeLimit};
pub use pitch::{Pitch, PitchError, PlaybackElement};
pub use question::{Question, QuestionError, SequenceKind, SequenceQuestion};
pub use result::{QuestionResult, QuizResult, QuizResultError};
