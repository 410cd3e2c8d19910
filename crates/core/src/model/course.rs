use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::question::Question;

/// Flat time limit for practice test questions, regardless of answer length.
pub const PRACTICE_TEST_LIMIT_MS: u64 = 90_000;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("declared question count ({declared}) does not match question list length ({actual})")]
    CountMismatch { declared: usize, actual: usize },

    #[error("unknown course id: {0}")]
    UnknownId(String),
}

//
// ─── COURSE ID ────────────────────────────────────────────────────────────────
//

/// Identity of one of the fixed courses, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CourseId {
    PreTest,
    Basic,
    Single,
    Multiple,
    Final,
    PostTest,
}

impl CourseId {
    /// All course ids in display order.
    pub const ALL: [CourseId; 6] = [
        CourseId::PreTest,
        CourseId::Basic,
        CourseId::Single,
        CourseId::Multiple,
        CourseId::Final,
        CourseId::PostTest,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CourseId::PreTest => "pre-test",
            CourseId::Basic => "basic",
            CourseId::Single => "single",
            CourseId::Multiple => "multiple",
            CourseId::Final => "final",
            CourseId::PostTest => "post-test",
        }
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseId {
    type Err = CourseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CourseError::UnknownId(s.to_string()))
    }
}

//
// ─── TIME LIMIT POLICY ────────────────────────────────────────────────────────
//

/// Per-question time limit policy declared by a course.
///
/// Practice test questions ignore the policy and always use
/// [`PRACTICE_TEST_LIMIT_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLimit {
    /// No timer is ever armed.
    Untimed,
    /// Same limit for every question.
    Flat(u64),
    /// Limit scales linearly with the required answer length.
    PerPitch(u64),
}

//
// ─── COURSE ───────────────────────────────────────────────────────────────────
//

/// An ordered, named set of questions with a shared time limit policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    name: String,
    path: String,
    time_limit: TimeLimit,
    questions: Vec<Question>,
}

impl Course {
    /// Build a course, validating the declared count against the question
    /// list length.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::CountMismatch` when the declared count is wrong.
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        path: impl Into<String>,
        declared_count: usize,
        time_limit: TimeLimit,
        questions: Vec<Question>,
    ) -> Result<Self, CourseError> {
        if declared_count != questions.len() {
            return Err(CourseError::CountMismatch {
                declared: declared_count,
                actual: questions.len(),
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            path: path.into(),
            time_limit,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Time limit for one question under this course's policy, in
    /// milliseconds. `None` means no timer is armed.
    #[must_use]
    pub fn time_limit_for(&self, question: &Question) -> Option<u64> {
        if question.is_practice_test() {
            return Some(PRACTICE_TEST_LIMIT_MS);
        }
        match self.time_limit {
            TimeLimit::Untimed => None,
            TimeLimit::Flat(ms) => Some(ms),
            TimeLimit::PerPitch(ms) => Some(ms * question.required_len() as u64),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pitch::Pitch;
    use crate::model::question::{SequenceKind, SequenceQuestion};

    fn single(pitch: Pitch) -> Question {
        Question::single(pitch, format!("question/singletone/{}.png", pitch.letter()))
    }

    #[test]
    fn declared_count_must_match() {
        let err = Course::new(
            CourseId::Basic,
            "Basic course",
            "/basic",
            3,
            TimeLimit::Untimed,
            vec![single(Pitch::Do)],
        )
        .unwrap_err();

        assert_eq!(
            err,
            CourseError::CountMismatch {
                declared: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn untimed_course_never_arms_a_timer() {
        let course = Course::new(
            CourseId::Basic,
            "Basic course",
            "/basic",
            1,
            TimeLimit::Untimed,
            vec![single(Pitch::Do)],
        )
        .unwrap();

        assert_eq!(course.time_limit_for(&course.questions()[0]), None);
    }

    #[test]
    fn per_pitch_limit_scales_with_answer_length() {
        let phrase = SequenceQuestion::new(
            vec![Pitch::Do, Pitch::Mi, Pitch::So],
            vec![Pitch::Do, Pitch::Mi, Pitch::So]
                .into_iter()
                .map(crate::model::pitch::PlaybackElement::Note)
                .collect(),
            "images/multiple/question7.png",
            None,
            SequenceKind::Phrase,
        )
        .unwrap();

        let course = Course::new(
            CourseId::Multiple,
            "Multi-note course",
            "/multiple",
            1,
            TimeLimit::PerPitch(5_000),
            vec![Question::Sequence(phrase)],
        )
        .unwrap();

        assert_eq!(course.time_limit_for(&course.questions()[0]), Some(15_000));
    }

    #[test]
    fn practice_test_overrides_the_policy() {
        let test = SequenceQuestion::new(
            vec![Pitch::Do, Pitch::Mi],
            Vec::new(),
            "question/test/pre_practice_test.png",
            None,
            SequenceKind::PracticeTest,
        )
        .unwrap();

        let course = Course::new(
            CourseId::PreTest,
            "Pre-practice test",
            "/pre-test",
            1,
            TimeLimit::PerPitch(5_000),
            vec![Question::Sequence(test)],
        )
        .unwrap();

        assert_eq!(
            course.time_limit_for(&course.questions()[0]),
            Some(PRACTICE_TEST_LIMIT_MS)
        );
    }

    #[test]
    fn course_id_round_trips() {
        for id in CourseId::ALL {
            assert_eq!(id.as_str().parse::<CourseId>().unwrap(), id);
        }
        assert!(matches!(
            "nope".parse::<CourseId>(),
            Err(CourseError::UnknownId(_))
        ));
    }
}
