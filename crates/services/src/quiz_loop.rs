use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use solfa_core::Clock;
use solfa_core::model::{Course, Pitch, QuizResult};
use storage::repository::QuizResultRepository;

use crate::audio::{AudioPlayer, DEFAULT_GAP_MS};
use crate::error::SessionError;
use crate::session::{AdvanceOutcome, QuizSession, SubmitOutcome, TimerRequest};

/// Orchestrates a quiz session against the clock, the audio capability, and
/// the result store.
///
/// The session itself stays synchronous; this service supplies timestamps,
/// fires the answer replay after grading, and persists the final result.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    results: Arc<dyn QuizResultRepository>,
    audio: Arc<dyn AudioPlayer>,
    playing: Arc<AtomicBool>,
    gap_ms: u64,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        results: Arc<dyn QuizResultRepository>,
        audio: Arc<dyn AudioPlayer>,
    ) -> Self {
        Self {
            clock,
            results,
            audio,
            playing: Arc::new(AtomicBool::new(false)),
            gap_ms: DEFAULT_GAP_MS,
        }
    }

    #[must_use]
    pub fn with_gap_ms(mut self, gap_ms: u64) -> Self {
        self.gap_ms = gap_ms;
        self
    }

    /// Start a session for the course. Returns it together with the timer
    /// to arm for the first question, if the course is timed.
    #[must_use]
    pub fn start(&self, course: Course) -> (QuizSession, Option<TimerRequest>) {
        debug!(course = %course.id(), questions = course.question_count(), "starting session");
        QuizSession::start(course, self.clock.now())
    }

    /// Submit a pitch, replaying the correct answer (fire-and-forget) when
    /// the submission triggers grading. Practice test questions replay
    /// nothing.
    pub fn submit(&self, session: &mut QuizSession, pitch: Pitch) -> SubmitOutcome {
        let outcome = session.submit(pitch, self.clock.now());
        if matches!(outcome, SubmitOutcome::Graded { .. }) {
            self.replay_answer(session);
        }
        outcome
    }

    /// Deliver a timeout event; stale generations are no-ops inside the
    /// session. The answer is replayed after a timeout grading too.
    pub fn timeout(&self, session: &mut QuizSession, generation: u64) -> bool {
        let graded = session.timeout(generation);
        if graded {
            self.replay_answer(session);
        }
        graded
    }

    /// Clear the in-progress answer for the current question.
    pub fn reset(&self, session: &mut QuizSession) {
        session.reset();
    }

    /// Advance past a graded question.
    pub fn advance(&self, session: &mut QuizSession) -> AdvanceOutcome {
        session.advance(self.clock.now())
    }

    /// Finalize a completed session and persist the result.
    ///
    /// Store failures are recovered locally: the result is still returned
    /// so quiz play stays usable when persistence is down.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while questions remain.
    pub async fn complete(&self, session: &QuizSession) -> Result<QuizResult, SessionError> {
        let result = session.finalize(self.clock.now())?;

        if let Err(err) = self.results.save(&result).await {
            warn!(course = result.course_name(), %err, "failed to persist quiz result");
        }
        Ok(result)
    }

    /// Read-only flag: true while a fired replay is still sounding. Drivers
    /// may use it to debounce "advance"; the session never blocks on it.
    #[must_use]
    pub fn is_playback_in_progress(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn replay_answer(&self, session: &QuizSession) {
        let Some(question) = session.current_question() else {
            return;
        };
        if question.is_practice_test() {
            return;
        }
        let elements = question.playback();
        if elements.is_empty() {
            return;
        }

        let audio = Arc::clone(&self.audio);
        let playing = Arc::clone(&self.playing);
        let gap_ms = self.gap_ms;
        playing.store(true, Ordering::Release);
        tokio::spawn(async move {
            audio.play_sequence(&elements, gap_ms).await;
            playing.store(false, Ordering::Release);
        });
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
