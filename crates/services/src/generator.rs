use rand::Rng;

use solfa_core::model::{Pitch, Question};

/// Generate a balanced, shuffled set of single-pitch questions.
///
/// Each of the seven base pitches appears exactly `repeat_count` times, so
/// the output holds `7 × repeat_count` questions in uniformly random order
/// (Fisher–Yates). A repeat count of zero yields an empty list.
///
/// Every call reshuffles; callers that need a stable question set across
/// invocations must cache the result themselves.
#[must_use]
pub fn generate(repeat_count: u32, image_path: impl Fn(Pitch) -> String) -> Vec<Question> {
    let mut questions = Vec::with_capacity(Pitch::BASE.len() * repeat_count as usize);
    for pitch in Pitch::BASE {
        for _ in 0..repeat_count {
            questions.push(Question::single(pitch, image_path(pitch)));
        }
    }

    let mut rng = rand::rng();
    for i in (1..questions.len()).rev() {
        let j = rng.random_range(0..=i);
        questions.swap(i, j);
    }

    questions
}
