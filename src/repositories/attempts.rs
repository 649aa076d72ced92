use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::{ExamAttempt, ScoredAttempt};

pub(crate) const COLUMNS: &str =
    "id, student_id, exam_id, start_time, end_time, score, is_completed";

/// Completed attempt with the student it belongs to.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AttemptResult {
    #[sqlx(flatten)]
    pub(crate) attempt: ExamAttempt,
    pub(crate) student_number: String,
    pub(crate) student_name: String,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!("SELECT {COLUMNS} FROM exam_attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_for(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    exam_id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE student_id = $1 AND exam_id = $2"
    ))
    .bind(student_id)
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) start_time: PrimitiveDateTime,
}

/// Returns `false` when the student already has an attempt for the exam.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exam_attempts (id, student_id, exam_id, start_time, is_completed)
         VALUES ($1,$2,$3,$4,FALSE)
         ON CONFLICT (student_id, exam_id) DO NOTHING",
    )
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.exam_id)
    .bind(params.start_time)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn finalize(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    end_time: PrimitiveDateTime,
    score: Option<f64>,
    is_completed: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exam_attempts SET end_time = $1, score = $2, is_completed = $3 WHERE id = $4",
    )
    .bind(end_time)
    .bind(score)
    .bind(is_completed)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn delete(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM exam_attempts WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn scored_for_student_course(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<Vec<ScoredAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ScoredAttempt>(
        "SELECT a.student_id, a.exam_id, a.score \
         FROM exam_attempts a JOIN exams x ON x.id = a.exam_id \
         WHERE a.student_id = $1 AND x.course_id = $2 \
           AND a.is_completed = TRUE AND a.score IS NOT NULL",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn all_scored(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<ScoredAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ScoredAttempt>(
        "SELECT student_id, exam_id, score FROM exam_attempts \
         WHERE is_completed = TRUE AND score IS NOT NULL",
    )
    .fetch_all(executor)
    .await
}

pub(crate) async fn completed_scores_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<f64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT score FROM exam_attempts \
         WHERE exam_id = $1 AND is_completed = TRUE AND score IS NOT NULL",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_results(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<AttemptResult>, sqlx::Error> {
    sqlx::query_as::<_, AttemptResult>(
        "SELECT a.id, a.student_id, a.exam_id, a.start_time, a.end_time, a.score, \
            a.is_completed, s.student_number, u.full_name AS student_name \
         FROM exam_attempts a \
         JOIN students s ON s.id = a.student_id \
         JOIN users u ON u.id = s.user_id \
         WHERE a.exam_id = $1 AND a.is_completed = TRUE \
         ORDER BY a.end_time DESC NULLS LAST",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_completed(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM exam_attempts WHERE is_completed = TRUE")
        .fetch_one(pool)
        .await
}
