use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Question;

const COLUMNS: &str = "\
    id, exam_id, question_text, option_a, option_b, option_c, option_d, option_e, \
    correct_answer, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE exam_id = $1 ORDER BY created_at, id"
    ))
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

/// Questions already served to an attempt, recovered from its stored answers.
pub(crate) async fn list_answered(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions q JOIN answers a ON a.question_id = q.id \
         WHERE a.attempt_id = $1 ORDER BY a.answered_at, q.id",
        qualified_columns()
    ))
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_by_exam(pool: &PgPool, exam_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(pool)
        .await
}

/// Case- and whitespace-insensitive match on the question text within one exam.
pub(crate) async fn text_exists(
    pool: &PgPool,
    exam_id: &str,
    question_text: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM questions \
         WHERE exam_id = $1 AND LOWER(TRIM(question_text)) = LOWER(TRIM($2)))",
    )
    .bind(exam_id)
    .bind(question_text)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) question_text: &'a str,
    pub(crate) options: [&'a str; 5],
    pub(crate) correct_answer: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    let [option_a, option_b, option_c, option_d, option_e] = params.options;

    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, exam_id, question_text, option_a, option_b, option_c, option_d, option_e,
            correct_answer, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.question_text)
    .bind(option_a)
    .bind(option_b)
    .bind(option_c)
    .bind(option_d)
    .bind(option_e)
    .bind(params.correct_answer)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

fn qualified_columns() -> String {
    COLUMNS.split(',').map(|column| format!("q.{}", column.trim())).collect::<Vec<_>>().join(", ")
}
