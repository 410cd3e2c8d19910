use solfa_core::model::{Pitch, QuizResult};

/// One flat row of the tabular export: a (question, response-index) pair.
///
/// Cells are `None` where the corresponding parallel array is shorter than
/// the row's index, which happens when an answer timed out short or carries
/// fewer latency samples than expected pitches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub course_name: String,
    pub question_index: u32,
    pub response_index: u32,
    pub correct_answer: Option<Pitch>,
    pub user_answer: Option<Pitch>,
    pub response_time_ms: Option<u64>,
}

/// Flatten quiz results into export rows.
///
/// Each question contributes one row per index up to the maximum of its
/// three parallel arrays (expected answer, submitted answer, latency
/// samples), so no recorded value is dropped.
#[must_use]
pub fn result_rows(results: &[QuizResult]) -> Vec<ExportRow> {
    let mut rows = Vec::new();

    for result in results {
        for question in result.questions() {
            let max_len = question
                .correct_answer
                .len()
                .max(question.user_answer.len())
                .max(question.response_times_ms.len());

            for index in 0..max_len {
                rows.push(ExportRow {
                    course_name: result.course_name().to_string(),
                    question_index: question.question_index,
                    response_index: index as u32,
                    correct_answer: question.correct_answer.get(index).copied(),
                    user_answer: question.user_answer.get(index).copied(),
                    response_time_ms: question.response_times_ms.get(index).copied(),
                });
            }
        }
    }

    rows
}

const CSV_HEADER: &str =
    "courseName,questionIndex,responseIndex,correctAnswer,userAnswer,responseTimesMs";

/// Render export rows as CSV with a UTF-8 BOM prefix for spreadsheet
/// compatibility. Every cell is quoted, with inner quotes doubled.
#[must_use]
pub fn render_csv(rows: &[ExportRow]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(CSV_HEADER);

    for row in rows {
        out.push('\n');
        let cells = [
            row.course_name.clone(),
            row.question_index.to_string(),
            row.response_index.to_string(),
            row.correct_answer.map(|p| p.to_string()).unwrap_or_default(),
            row.user_answer.map(|p| p.to_string()).unwrap_or_default(),
            row.response_time_ms
                .map(|ms| ms.to_string())
                .unwrap_or_default(),
        ];
        let line: Vec<String> = cells
            .iter()
            .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
            .collect();
        out.push_str(&line.join(","));
    }

    out
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
