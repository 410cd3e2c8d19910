use chrono::{DateTime, Utc};
use tracing::debug;

use solfa_core::grade;
use solfa_core::model::{Course, Pitch, Question, QuestionResult, QuizResult};

use crate::error::SessionError;

//
// ─── STATES AND OUTCOMES ──────────────────────────────────────────────────────
//

/// State of the session for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Accepting pitch submissions for the current question.
    Answering,
    /// Current question graded correct; waiting for advance.
    Correct,
    /// Current question graded incorrect; waiting for advance.
    Incorrect,
    /// All questions graded. Terminal.
    Completed,
}

/// Request to arm a timeout for the current question.
///
/// The generation token belongs to exactly one question; a timeout event
/// carrying any other generation is stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub generation: u64,
    pub limit_ms: u64,
}

/// Outcome of a pitch submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Pitch appended; more pitches are required before grading.
    Accepted,
    /// The required count was reached and the answer was graded.
    Graded { is_correct: bool },
    /// Late click after grading, or the session is complete. No state change.
    Ignored,
}

/// Outcome of an advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next question; arm the returned timer if any.
    NextQuestion(Option<TimerRequest>),
    /// No questions remain; the session is now complete.
    Completed,
    /// Advance is only valid after grading. No state change.
    Ignored,
}

//
// ─── QUIZ SESSION ─────────────────────────────────────────────────────────────
//

/// One run through a course: owns the question cursor, the in-progress
/// answer, latency samples, timers' generation token, and the result log.
///
/// All transitions are driven by discrete events (`submit`, `timeout`,
/// `reset`, `advance`), each processed to completion. Latency convention:
/// a sample measures the time since the previous submission, or since
/// question start for the first sample; `reset` erases samples but does not
/// restart the question clock, so the next first sample is still measured
/// from the original question start.
#[derive(Debug)]
pub struct QuizSession {
    course: Course,
    current: usize,
    state: QuizState,
    accumulated: Vec<Pitch>,
    samples: Vec<u64>,
    question_started_at: DateTime<Utc>,
    last_submission_at: DateTime<Utc>,
    correct_count: u32,
    results: Vec<QuestionResult>,
    started_at: DateTime<Utc>,
    generation: u64,
}

impl QuizSession {
    /// Start a session at the course's first question.
    ///
    /// Returns the session plus the timer to arm for the first question, if
    /// the course is timed. An empty course completes immediately.
    #[must_use]
    pub fn start(course: Course, now: DateTime<Utc>) -> (Self, Option<TimerRequest>) {
        let state = if course.question_count() == 0 {
            QuizState::Completed
        } else {
            QuizState::Answering
        };

        let session = Self {
            course,
            current: 0,
            state,
            accumulated: Vec::new(),
            samples: Vec::new(),
            question_started_at: now,
            last_submission_at: now,
            correct_count: 0,
            results: Vec::new(),
            started_at: now,
            generation: 1,
        };
        let timer = session.current_timer();
        (session, timer)
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == QuizState::Completed
    }

    /// Index of the question currently presented.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.course.questions().get(self.current)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.course.question_count()
    }

    /// Number of questions graded so far.
    #[must_use]
    pub fn graded_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    /// The in-progress answer for the current question.
    #[must_use]
    pub fn accumulated(&self) -> &[Pitch] {
        &self.accumulated
    }

    #[must_use]
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Generation token owned by the current question's timer.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Timer to arm for the current question, if the course is timed and the
    /// session is answering.
    #[must_use]
    pub fn current_timer(&self) -> Option<TimerRequest> {
        if self.state != QuizState::Answering {
            return None;
        }
        let question = self.current_question()?;
        self.course.time_limit_for(question).map(|limit_ms| TimerRequest {
            generation: self.generation,
            limit_ms,
        })
    }

    /// Submit one pitch for the current question.
    ///
    /// Appends the pitch, records a latency sample, and grades immediately
    /// once the required count is reached. Submissions outside `Answering`
    /// are ignored (late clicks after grading), as are submissions beyond
    /// the required count.
    pub fn submit(&mut self, pitch: Pitch, now: DateTime<Utc>) -> SubmitOutcome {
        if self.state != QuizState::Answering {
            return SubmitOutcome::Ignored;
        }
        let Some(question) = self.course.questions().get(self.current) else {
            return SubmitOutcome::Ignored;
        };
        let required = question.required_len();
        if self.accumulated.len() >= required {
            // Contract violation; refuse rather than corrupt state.
            return SubmitOutcome::Ignored;
        }

        let sample = (now - self.last_submission_at).num_milliseconds().max(0) as u64;
        self.samples.push(sample);
        self.last_submission_at = now;
        self.accumulated.push(pitch);

        if self.accumulated.len() < required {
            return SubmitOutcome::Accepted;
        }

        let is_correct = grade(&self.accumulated, question.expected());
        self.record_grading(is_correct);
        SubmitOutcome::Graded { is_correct }
    }

    /// Handle a timeout event for the given generation.
    ///
    /// Grades the current question as incorrect using the partial answer
    /// accumulated so far. A timeout carrying a stale generation, or firing
    /// after grading already occurred, is a no-op; returns whether the event
    /// caused a transition.
    pub fn timeout(&mut self, generation: u64) -> bool {
        if self.state != QuizState::Answering || generation != self.generation {
            debug!(generation, current = self.generation, "ignoring stale timeout");
            return false;
        }
        if self.current_question().is_none() {
            return false;
        }

        self.record_grading(false);
        true
    }

    /// Clear the in-progress answer and its latency samples, staying on the
    /// same question. Only meaningful while answering, before the required
    /// count is reached; does not touch the timeout or the correct counter.
    pub fn reset(&mut self) {
        if self.state != QuizState::Answering {
            return;
        }
        self.accumulated.clear();
        self.samples.clear();
        self.last_submission_at = self.question_started_at;
    }

    /// Move past a graded question.
    ///
    /// Restarts `Answering` on the next question with fresh state and a new
    /// timer generation, or completes the session when no questions remain.
    pub fn advance(&mut self, now: DateTime<Utc>) -> AdvanceOutcome {
        match self.state {
            QuizState::Correct | QuizState::Incorrect => {}
            QuizState::Answering | QuizState::Completed => return AdvanceOutcome::Ignored,
        }

        self.current += 1;
        self.generation += 1;
        self.accumulated.clear();
        self.samples.clear();
        self.question_started_at = now;
        self.last_submission_at = now;

        if self.current < self.course.question_count() {
            self.state = QuizState::Answering;
            AdvanceOutcome::NextQuestion(self.current_timer())
        } else {
            self.state = QuizState::Completed;
            debug!(course = %self.course.id(), "session completed");
            AdvanceOutcome::Completed
        }
    }

    /// Aggregate the completed session into a quiz result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while questions remain, and
    /// propagates aggregation errors.
    pub fn finalize(&self, now: DateTime<Utc>) -> Result<QuizResult, SessionError> {
        if self.state != QuizState::Completed {
            return Err(SessionError::NotCompleted);
        }
        let result = QuizResult::finalize(
            self.course.name(),
            self.results.clone(),
            self.started_at,
            now,
        )?;
        Ok(result)
    }

    fn record_grading(&mut self, is_correct: bool) {
        let question = &self.course.questions()[self.current];
        if is_correct {
            self.correct_count += 1;
            self.state = QuizState::Correct;
        } else {
            self.state = QuizState::Incorrect;
        }

        self.results.push(QuestionResult {
            question_index: self.current as u32,
            correct_answer: question.expected().to_vec(),
            user_answer: self.accumulated.clone(),
            is_correct,
            response_times_ms: self.samples.clone(),
        });
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
