use chrono::Duration;
use solfa_core::model::{Pitch, QuestionResult, QuizResult};
use solfa_core::time::fixed_now;
use storage::repository::{QuizResultRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn build_result(course_name: &str, correct: bool) -> QuizResult {
    let question = QuestionResult {
        question_index: 0,
        correct_answer: vec![Pitch::Do, Pitch::Mi, Pitch::So],
        user_answer: if correct {
            vec![Pitch::Do, Pitch::Mi, Pitch::So]
        } else {
            vec![Pitch::Do, Pitch::Mi]
        },
        is_correct: correct,
        response_times_ms: vec![1_200, 600, 450],
    };
    QuizResult::finalize(
        course_name,
        vec![question],
        fixed_now(),
        fixed_now() + Duration::seconds(7),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_question_payload() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let result = build_result("multiple", true);
    repo.save(&result).await.unwrap();

    let fetched = repo.get("multiple").await.expect("fetch");
    assert_eq!(fetched, result);
    assert_eq!(fetched.questions().len(), 1);
    assert_eq!(
        fetched.questions()[0].correct_answer,
        vec![Pitch::Do, Pitch::Mi, Pitch::So]
    );
    assert_eq!(fetched.questions()[0].response_times_ms, vec![1_200, 600, 450]);
}

#[tokio::test]
async fn sqlite_overwrites_by_course_name() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save(&build_result("single", false)).await.unwrap();
    repo.save(&build_result("single", true)).await.unwrap();

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].correct_count(), 1);
}

#[tokio::test]
async fn sqlite_delete_and_delete_all() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_delete?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save(&build_result("basic", true)).await.unwrap();
    repo.save(&build_result("final", false)).await.unwrap();

    repo.delete("basic").await.unwrap();
    assert!(matches!(
        repo.get("basic").await.unwrap_err(),
        StorageError::NotFound
    ));
    assert_eq!(repo.get_all().await.unwrap().len(), 1);

    repo.delete_all().await.unwrap();
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    repo.save(&build_result("post-test", true)).await.unwrap();
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}
