use solfa_core::model::{QuestionResult, QuizResult};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{QuizResultRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn ms_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizResult, StorageError> {
    let course_name: String = row.try_get("course_name").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let correct_count = u32_from_i64(
        "correct_count",
        row.try_get::<i64, _>("correct_count").map_err(ser)?,
    )?;
    let average_response_time_ms = u64_from_i64(
        "average_response_time_ms",
        row.try_get::<i64, _>("average_response_time_ms")
            .map_err(ser)?,
    )?;
    let total_time_ms = u64_from_i64(
        "total_time_ms",
        row.try_get::<i64, _>("total_time_ms").map_err(ser)?,
    )?;

    let questions_json: String = row.try_get("questions").map_err(ser)?;
    let questions: Vec<QuestionResult> =
        serde_json::from_str(&questions_json).map_err(ser)?;

    QuizResult::from_persisted(
        course_name,
        completed_at,
        total_questions,
        correct_count,
        questions,
        average_response_time_ms,
        total_time_ms,
    )
    .map_err(ser)
}

#[async_trait::async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn get(&self, course_name: &str) -> Result<QuizResult, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    course_name, completed_at, total_questions, correct_count,
                    average_response_time_ms, total_time_ms, questions
                FROM quiz_results
                WHERE course_name = ?1
            ",
        )
        .bind(course_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn get_all(&self) -> Result<Vec<QuizResult>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    course_name, completed_at, total_questions, correct_count,
                    average_response_time_ms, total_time_ms, questions
                FROM quiz_results
                ORDER BY course_name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_result_row(&row)?);
        }
        Ok(out)
    }

    async fn save(&self, result: &QuizResult) -> Result<(), StorageError> {
        let questions = serde_json::to_string(result.questions()).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO quiz_results (
                    course_name, completed_at, total_questions, correct_count,
                    average_response_time_ms, total_time_ms, questions
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(course_name) DO UPDATE SET
                    completed_at = excluded.completed_at,
                    total_questions = excluded.total_questions,
                    correct_count = excluded.correct_count,
                    average_response_time_ms = excluded.average_response_time_ms,
                    total_time_ms = excluded.total_time_ms,
                    questions = excluded.questions
            ",
        )
        .bind(result.course_name())
        .bind(result.completed_at())
        .bind(i64::from(result.total_questions()))
        .bind(i64::from(result.correct_count()))
        .bind(ms_i64(
            "average_response_time_ms",
            result.average_response_time_ms(),
        )?)
        .bind(ms_i64("total_time_ms", result.total_time_ms())?)
        .bind(questions)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn delete(&self, course_name: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_results WHERE course_name = ?1")
            .bind(course_name)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_results")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
