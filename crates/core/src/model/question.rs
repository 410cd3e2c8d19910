use std::slice;
use thiserror::Error;

use crate::model::pitch::{Pitch, PlaybackElement};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("answer sequence is empty")]
    EmptyAnswer,

    #[error("playback sequence does not match the answer sequence")]
    PlaybackMismatch,

    #[error("practice test questions carry no playback rendition")]
    PracticeTestHasPlayback,
}

//
// ─── QUESTION SHAPES ──────────────────────────────────────────────────────────
//

/// Discriminant for sequence questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Ordinary phrase: the answer is replayed (with its silences) after
    /// grading, and the time limit follows the course policy.
    Phrase,
    /// Pre/post assessment phrase: nothing is ever replayed, and a separate
    /// flat time limit applies regardless of answer length.
    PracticeTest,
}

/// Multi-pitch question: an ordered answer plus an independent audible
/// rendition that interleaves silences between the answer pitches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceQuestion {
    answer: Vec<Pitch>,
    playback: Vec<PlaybackElement>,
    image_path: String,
    description: Option<String>,
    kind: SequenceKind,
}

impl SequenceQuestion {
    /// Build a validated sequence question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyAnswer` for an empty answer,
    /// `QuestionError::PracticeTestHasPlayback` when a practice test carries
    /// a rendition, and `QuestionError::PlaybackMismatch` when the playback's
    /// non-silence elements are not exactly the answer in order.
    pub fn new(
        answer: Vec<Pitch>,
        playback: Vec<PlaybackElement>,
        image_path: impl Into<String>,
        description: Option<String>,
        kind: SequenceKind,
    ) -> Result<Self, QuestionError> {
        if answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        match kind {
            SequenceKind::PracticeTest => {
                if !playback.is_empty() {
                    return Err(QuestionError::PracticeTestHasPlayback);
                }
            }
            SequenceKind::Phrase => {
                let audible: Vec<Pitch> =
                    playback.iter().filter_map(|e| e.pitch()).collect();
                if audible != answer {
                    return Err(QuestionError::PlaybackMismatch);
                }
            }
        }

        Ok(Self {
            answer,
            playback,
            image_path: image_path.into(),
            description,
            kind,
        })
    }

    #[must_use]
    pub fn answer(&self) -> &[Pitch] {
        &self.answer
    }

    #[must_use]
    pub fn playback(&self) -> &[PlaybackElement] {
        &self.playback
    }

    #[must_use]
    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A quiz question, dispatched by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// One expected pitch; required answer length is always 1.
    SinglePitch { pitch: Pitch, image_path: String },
    Sequence(SequenceQuestion),
}

impl Question {
    /// Convenience constructor for a single-pitch question.
    #[must_use]
    pub fn single(pitch: Pitch, image_path: impl Into<String>) -> Self {
        Question::SinglePitch {
            pitch,
            image_path: image_path.into(),
        }
    }

    /// Number of pitches a complete answer must contain.
    #[must_use]
    pub fn required_len(&self) -> usize {
        match self {
            Question::SinglePitch { .. } => 1,
            Question::Sequence(q) => q.answer.len(),
        }
    }

    /// The expected answer, silences excluded by construction.
    #[must_use]
    pub fn expected(&self) -> &[Pitch] {
        match self {
            Question::SinglePitch { pitch, .. } => slice::from_ref(pitch),
            Question::Sequence(q) => &q.answer,
        }
    }

    /// The audible rendition to replay after grading. Empty for practice
    /// tests, which replay nothing.
    #[must_use]
    pub fn playback(&self) -> Vec<PlaybackElement> {
        match self {
            Question::SinglePitch { pitch, .. } => vec![PlaybackElement::Note(*pitch)],
            Question::Sequence(q) => q.playback.clone(),
        }
    }

    #[must_use]
    pub fn image_path(&self) -> &str {
        match self {
            Question::SinglePitch { image_path, .. } => image_path,
            Question::Sequence(q) => &q.image_path,
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Question::SinglePitch { .. } => None,
            Question::Sequence(q) => q.description(),
        }
    }

    #[must_use]
    pub fn is_practice_test(&self) -> bool {
        matches!(
            self,
            Question::Sequence(q) if q.kind == SequenceKind::PracticeTest
        )
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(pitches: &[Pitch]) -> Vec<PlaybackElement> {
        pitches.iter().map(|p| PlaybackElement::Note(*p)).collect()
    }

    #[test]
    fn single_pitch_has_required_len_one() {
        let q = Question::single(Pitch::Mi, "question/singletone/e.png");
        assert_eq!(q.required_len(), 1);
        assert_eq!(q.expected(), &[Pitch::Mi]);
        assert_eq!(q.playback(), vec![PlaybackElement::Note(Pitch::Mi)]);
        assert!(!q.is_practice_test());
    }

    #[test]
    fn playback_may_interleave_silences() {
        let q = SequenceQuestion::new(
            vec![Pitch::Do, Pitch::So],
            vec![
                PlaybackElement::Note(Pitch::Do),
                PlaybackElement::Silence,
                PlaybackElement::Note(Pitch::So),
            ],
            "images/multiple/question4.png",
            None,
            SequenceKind::Phrase,
        )
        .unwrap();

        assert_eq!(q.answer(), &[Pitch::Do, Pitch::So]);
        assert_eq!(q.playback().len(), 3);
    }

    #[test]
    fn reordered_playback_is_rejected() {
        let err = SequenceQuestion::new(
            vec![Pitch::Do, Pitch::So],
            vec![
                PlaybackElement::Note(Pitch::So),
                PlaybackElement::Note(Pitch::Do),
            ],
            "img.png",
            None,
            SequenceKind::Phrase,
        )
        .unwrap_err();

        assert_eq!(err, QuestionError::PlaybackMismatch);
    }

    #[test]
    fn playback_shorter_than_answer_is_rejected() {
        let err = SequenceQuestion::new(
            vec![Pitch::Do, Pitch::So],
            vec![PlaybackElement::Note(Pitch::Do), PlaybackElement::Silence],
            "img.png",
            None,
            SequenceKind::Phrase,
        )
        .unwrap_err();

        assert_eq!(err, QuestionError::PlaybackMismatch);
    }

    #[test]
    fn empty_answer_is_rejected() {
        let err = SequenceQuestion::new(
            Vec::new(),
            Vec::new(),
            "img.png",
            None,
            SequenceKind::Phrase,
        )
        .unwrap_err();

        assert_eq!(err, QuestionError::EmptyAnswer);
    }

    #[test]
    fn practice_test_must_not_carry_playback() {
        let err = SequenceQuestion::new(
            vec![Pitch::Do],
            notes(&[Pitch::Do]),
            "img.png",
            None,
            SequenceKind::PracticeTest,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::PracticeTestHasPlayback);

        let q = SequenceQuestion::new(
            vec![Pitch::Do],
            Vec::new(),
            "img.png",
            None,
            SequenceKind::PracticeTest,
        )
        .unwrap();
        let q = Question::Sequence(q);
        assert!(q.is_practice_test());
        assert!(q.playback().is_empty());
    }
}
