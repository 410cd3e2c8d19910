use std::sync::Arc;
use std::time::Duration;

use services::{
    CourseCatalog, QuizLoopService, SilentPlayer, SubmitOutcome, TimeoutScheduler,
};
use solfa_core::model::{CourseId, Pitch, Question};
use solfa_core::time::fixed_clock;
use storage::repository::{InMemoryRepository, QuizResultRepository};

fn service(repo: &InMemoryRepository) -> QuizLoopService {
    QuizLoopService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(SilentPlayer))
}

#[tokio::test]
async fn full_multiple_course_run_persists_an_overwritable_result() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let course = CourseCatalog::new().course(CourseId::Multiple).unwrap();

    // Answer every question correctly by echoing its expected sequence.
    let (mut session, _) = service.start(course.clone());
    while !session.is_complete() {
        let expected: Vec<Pitch> = session.current_question().unwrap().expected().to_vec();
        for pitch in expected {
            service.submit(&mut session, pitch);
        }
        service.advance(&mut session);
    }

    let result = service.complete(&session).await.unwrap();
    assert_eq!(result.total_questions(), 21);
    assert_eq!(result.correct_count(), 21);

    // A second, all-wrong run overwrites the stored record.
    let (mut session, _) = service.start(course);
    while !session.is_complete() {
        let required = session.current_question().unwrap().required_len();
        let expected_first = session.current_question().unwrap().expected()[0];
        let wrong = Pitch::ALL
            .into_iter()
            .find(|p| *p != expected_first)
            .unwrap();
        for _ in 0..required {
            service.submit(&mut session, wrong);
        }
        service.advance(&mut session);
    }
    let overwritten = service.complete(&session).await.unwrap();
    assert_eq!(overwritten.correct_count(), 0);

    let stored = repo.get("Multi-note course").await.unwrap();
    assert_eq!(stored.correct_count(), 0);
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn scheduler_timeout_grades_the_unanswered_question() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let course = CourseCatalog::new().course(CourseId::Single).unwrap();
    let (mut session, first_timer) = service.start(course);

    let (mut scheduler, mut timeouts) = TimeoutScheduler::new();
    scheduler.arm(first_timer.expect("single-note course is timed"));

    // No answer arrives within the 5s limit.
    tokio::time::advance(Duration::from_millis(5_001)).await;
    let generation = timeouts.recv().await.unwrap();
    assert!(service.timeout(&mut session, generation));

    let first = &session.results()[0];
    assert!(!first.is_correct);
    assert!(first.user_answer.is_empty());
    assert!(first.response_times_ms.is_empty());

    // A late duplicate of the same generation is ignored.
    assert!(!service.timeout(&mut session, generation));
}

#[tokio::test(start_paused = true)]
async fn answering_in_time_outruns_the_armed_timer() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let course = CourseCatalog::new().course(CourseId::Single).unwrap();
    let (mut session, first_timer) = service.start(course);

    let (mut scheduler, mut timeouts) = TimeoutScheduler::new();
    scheduler.arm(first_timer.unwrap());

    let expected = session.current_question().unwrap().expected()[0];
    let outcome = service.submit(&mut session, expected);
    assert_eq!(outcome, SubmitOutcome::Graded { is_correct: true });
    scheduler.disarm();

    tokio::time::advance(Duration::from_millis(6_000)).await;
    assert!(timeouts.try_recv().is_err());
    assert_eq!(session.correct_count(), 1);
}

#[tokio::test]
async fn practice_test_replays_nothing_after_grading() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let course = CourseCatalog::new().course(CourseId::PreTest).unwrap();
    let (mut session, timer) = service.start(course);

    // Practice tests are timed with the flat assessment limit.
    assert_eq!(timer.unwrap().limit_ms, 90_000);

    let expected: Vec<Pitch> = session.current_question().unwrap().expected().to_vec();
    for pitch in expected {
        service.submit(&mut session, pitch);
    }
    assert!(!service.is_playback_in_progress());

    service.advance(&mut session);
    let result = service.complete(&session).await.unwrap();
    assert_eq!(result.correct_count(), 1);
}

#[tokio::test]
async fn export_covers_the_persisted_run() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let course = CourseCatalog::new().course(CourseId::Final).unwrap();

    let (mut session, _) = service.start(course);
    let expected: Vec<Pitch> = session.current_question().unwrap().expected().to_vec();
    for pitch in &expected {
        service.submit(&mut session, *pitch);
    }
    service.advance(&mut session);
    service.complete(&session).await.unwrap();

    let stored = repo.get_all().await.unwrap();
    let rows = services::result_rows(&stored);
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| r.course_name == "Final course"));

    let csv = services::render_csv(&rows);
    assert_eq!(csv.lines().count(), 21);
}

#[tokio::test]
async fn generated_single_course_presents_only_single_pitch_questions() {
    let course = CourseCatalog::new().course(CourseId::Single).unwrap();
    assert!(course
        .questions()
        .iter()
        .all(|q| matches!(q, Question::SinglePitch { .. })));
}
