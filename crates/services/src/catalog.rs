use solfa_core::model::{
    Course, CourseId, Pitch, PlaybackElement, Question, SequenceKind, SequenceQuestion, TimeLimit,
};

use crate::error::CatalogError;
use crate::generator::generate;

/// Flat per-question limit for the single-note course.
const SINGLE_LIMIT_MS: u64 = 5_000;

/// Per-pitch limit for the multi-note and final courses.
const PER_PITCH_LIMIT_MS: u64 = 5_000;

/// One line of the course listing: what the home screen shows before any
/// questions are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: CourseId,
    pub name: &'static str,
    pub question_count: usize,
    pub path: &'static str,
}

/// The fixed set of courses, in display order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseCatalog;

impl CourseCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Course listing in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<CatalogEntry> {
        CourseId::ALL
            .into_iter()
            .map(|id| {
                let (name, question_count, path) = metadata(id);
                CatalogEntry {
                    id,
                    name,
                    question_count,
                    path,
                }
            })
            .collect()
    }

    /// Build a course with its full question list.
    ///
    /// The generated courses reshuffle on every call; static courses always
    /// return the same questions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if a static question or the declared count
    /// fails validation.
    pub fn course(&self, id: CourseId) -> Result<Course, CatalogError> {
        let (name, declared_count, path) = metadata(id);
        let (time_limit, questions) = match id {
            CourseId::PreTest => (TimeLimit::Untimed, vec![pre_test_question()?]),
            CourseId::Basic => (TimeLimit::Untimed, generate(2, single_tone_image)),
            CourseId::Single => (
                TimeLimit::Flat(SINGLE_LIMIT_MS),
                generate(3, single_tone_image),
            ),
            CourseId::Multiple => (
                TimeLimit::PerPitch(PER_PITCH_LIMIT_MS),
                multiple_note_questions()?,
            ),
            CourseId::Final => (
                TimeLimit::PerPitch(PER_PITCH_LIMIT_MS),
                vec![final_question()?],
            ),
            CourseId::PostTest => (TimeLimit::Untimed, vec![post_test_question()?]),
        };

        let course = Course::new(id, name, path, declared_count, time_limit, questions)?;
        Ok(course)
    }

    /// Sort key for displaying results: catalog position by course name,
    /// with unknown names last.
    #[must_use]
    pub fn display_rank(&self, course_name: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e.name == course_name)
            .unwrap_or(usize::MAX)
    }
}

fn metadata(id: CourseId) -> (&'static str, usize, &'static str) {
    match id {
        CourseId::PreTest => ("Pre-practice test", 1, "/pre-test"),
        CourseId::Basic => ("Basic course", 14, "/basic"),
        CourseId::Single => ("Single-note course", 21, "/single"),
        CourseId::Multiple => ("Multi-note course", 21, "/multiple"),
        CourseId::Final => ("Final course", 1, "/final"),
        CourseId::PostTest => ("Post-practice test", 1, "/post-test"),
    }
}

/// Sheet image path for a generated single-tone question.
#[must_use]
pub fn single_tone_image(pitch: Pitch) -> String {
    format!("/question/singletone/{}.png", pitch.letter())
}

fn phrase(
    index: usize,
    answer: &[Pitch],
    rest_before: &[usize],
    description: &'static str,
) -> Result<Question, CatalogError> {
    // `rest_before` lists answer positions that a silence precedes; a
    // position equal to the answer length appends a trailing silence.
    let mut playback = Vec::with_capacity(answer.len() + rest_before.len());
    for (i, pitch) in answer.iter().enumerate() {
        if rest_before.contains(&i) {
            playback.push(PlaybackElement::Silence);
        }
        playback.push(PlaybackElement::Note(*pitch));
    }
    if rest_before.contains(&answer.len()) {
        playback.push(PlaybackElement::Silence);
    }

    let question = SequenceQuestion::new(
        answer.to_vec(),
        playback,
        format!("/images/multiple/question{index}.png"),
        Some(description.to_string()),
        SequenceKind::Phrase,
    )?;
    Ok(Question::Sequence(question))
}

/// The 21 fixed multi-note questions: 2 to 4 answer pitches, part of them
/// with silences interleaved in the playback.
fn multiple_note_questions() -> Result<Vec<Question>, CatalogError> {
    use Pitch::{Do, Fa, La, Mi, Re, Si, So};

    const IN_ORDER_2: &str = "Answer the two pitches in order";
    const IN_ORDER_3: &str = "Answer the three pitches in order";
    const IN_ORDER_4: &str = "Answer the four pitches in order";
    const IGNORE_RESTS: &str = "Answer the pitches in order, ignoring the rests";

    let specs: [(&[Pitch], &[usize], &'static str); 21] = [
        // Two pitches, no rests.
        (&[Do, Mi], &[], IN_ORDER_2),
        (&[Re, Fa], &[], IN_ORDER_2),
        (&[Mi, So], &[], IN_ORDER_2),
        // Two pitches with a rest.
        (&[Do, So], &[1], IGNORE_RESTS),
        (&[Re, La], &[1], IGNORE_RESTS),
        (&[Fa, Si], &[0], IGNORE_RESTS),
        // Three pitches, no rests.
        (&[Do, Mi, So], &[], IN_ORDER_3),
        (&[Re, Fa, La], &[], IN_ORDER_3),
        (&[Mi, So, Si], &[], IN_ORDER_3),
        (&[Do, Re, Mi], &[], IN_ORDER_3),
        // Three pitches with rests.
        (&[Do, Mi, So], &[1], IGNORE_RESTS),
        (&[Fa, La, Do], &[2], IGNORE_RESTS),
        (&[So, Si, Re], &[0], IGNORE_RESTS),
        (&[Re, Fa, So], &[1, 2], IGNORE_RESTS),
        // Four pitches, no rests.
        (&[Do, Re, Mi, Fa], &[], IN_ORDER_4),
        (&[So, La, Si, Do], &[], IN_ORDER_4),
        (&[Mi, Fa, So, La], &[], IN_ORDER_4),
        // Four pitches with rests.
        (&[Do, Mi, So, Do], &[1], IGNORE_RESTS),
        (&[Re, Fa, La, Si], &[2], IGNORE_RESTS),
        (&[Fa, So, La, Si], &[0, 2], IGNORE_RESTS),
        (&[Do, Re, Mi, So], &[0, 1, 3], IGNORE_RESTS),
    ];

    specs
        .iter()
        .enumerate()
        .map(|(i, &(answer, rests, desc))| phrase(i + 1, answer, rests, desc))
        .collect()
}

/// The final course's single question: a 20-pitch phrase whose playback
/// interleaves 4 silences (24 elements).
fn final_question() -> Result<Question, CatalogError> {
    use Pitch::{Do, Fa, La, Mi, Re, Si, So};

    let answer = vec![
        Do, Re, Mi, Fa, So, So, Fa, Mi, Re, Do, Mi, So, Do, Re, Fa, La, Do, Si, La, So,
    ];
    let rest_before = [5_usize, 10, 13, 16];

    let mut playback = Vec::with_capacity(answer.len() + rest_before.len());
    for (i, pitch) in answer.iter().enumerate() {
        if rest_before.contains(&i) {
            playback.push(PlaybackElement::Silence);
        }
        playback.push(PlaybackElement::Note(*pitch));
    }

    let question = SequenceQuestion::new(
        answer,
        playback,
        "/images/final/final_question.png",
        Some("Final task: answer the 20-pitch phrase in order, ignoring the rests".to_string()),
        SequenceKind::Phrase,
    )?;
    Ok(Question::Sequence(question))
}

fn pre_test_question() -> Result<Question, CatalogError> {
    use Pitch::{Do, Do2, Fa, La, Mi, Si, So};

    let question = SequenceQuestion::new(
        vec![Do, Mi, Fa, So, Mi, So, So, Fa, So, La, Fa, La, Si, Do2, La],
        Vec::new(),
        "/question/test/pre_practice_test.png",
        Some("Pre-practice assessment".to_string()),
        SequenceKind::PracticeTest,
    )?;
    Ok(Question::Sequence(question))
}

fn post_test_question() -> Result<Question, CatalogError> {
    use Pitch::{Do, Do2, Fa, La, Mi, Si, So};

    let question = SequenceQuestion::new(
        vec![So, So, La, Si, Do2, La, Do, Fa, So, La, Fa, Mi, Fa, So, Mi],
        Vec::new(),
        "/question/test/post_practice_test.png",
        Some("Post-practice assessment".to_string()),
        SequenceKind::PracticeTest,
    )?;
    Ok(Question::Sequence(question))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
