use exam_core::model::{
    DepartmentId, ExamBlueprint, ExamId, OptionIndex, Question, QuestionId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn exam_id_from_i64(v: i64) -> Result<ExamId, StorageError> {
    Ok(ExamId::new(i64_to_u64("exam_id", v)?))
}

pub(crate) fn department_id_from_i64(v: i64) -> Result<DepartmentId, StorageError> {
    Ok(DepartmentId::new(i64_to_u64("department_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn option_index_from_i64(field: &'static str, v: i64) -> Result<OptionIndex, StorageError> {
    let raw = u8::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))?;
    OptionIndex::new(raw).map_err(ser)
}

pub(crate) fn map_exam_row(row: &sqlx::sqlite::SqliteRow) -> Result<ExamBlueprint, StorageError> {
    let exam_id = exam_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let department_id =
        department_id_from_i64(row.try_get::<i64, _>("department_id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let duration_seconds = u32_from_i64(
        "duration_seconds",
        row.try_get::<i64, _>("duration_seconds").map_err(ser)?,
    )?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let percent_raw: i64 = row.try_get("passing_threshold_percent").map_err(ser)?;
    let percent = u8::try_from(percent_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid passing percent: {percent_raw}")))?;

    ExamBlueprint::new(exam_id, department_id, title, duration_seconds, total_questions)
        .and_then(|b| b.with_passing_threshold(percent))
        .map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let prompt: String = row.try_get("prompt").map_err(ser)?;
    let prompt_secondary: Option<String> = row.try_get("prompt_secondary").map_err(ser)?;
    let options = [
        row.try_get::<String, _>("option_0").map_err(ser)?,
        row.try_get::<String, _>("option_1").map_err(ser)?,
        row.try_get::<String, _>("option_2").map_err(ser)?,
        row.try_get::<String, _>("option_3").map_err(ser)?,
    ];
    let correct = option_index_from_i64(
        "correct_option",
        row.try_get::<i64, _>("correct_option").map_err(ser)?,
    )?;

    Question::new(id, prompt, prompt_secondary, options, correct).map_err(ser)
}
