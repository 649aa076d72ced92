use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::{Exam, ExamWeight};

const COLUMNS: &str = "\
    id, course_id, exam_type, weight_percentage, start_time, end_time, \
    duration_minutes, created_at";

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ExamWithQuestionCount {
    #[sqlx(flatten)]
    pub(crate) exam: Exam,
    pub(crate) question_count: i64,
}

/// Per-exam figures over completed attempts, for course reports.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ExamAttemptStats {
    pub(crate) exam_id: String,
    pub(crate) exam_type: String,
    pub(crate) weight_percentage: f64,
    pub(crate) average_score: Option<f64>,
    pub(crate) attempt_count: i64,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {COLUMNS} FROM exams WHERE course_id = $1 ORDER BY start_time, id"
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_with_question_counts(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<ExamWithQuestionCount>, sqlx::Error> {
    sqlx::query_as::<_, ExamWithQuestionCount>(&format!(
        "SELECT {COLUMNS}, \
            (SELECT COUNT(*) FROM questions q WHERE q.exam_id = exams.id) AS question_count \
         FROM exams WHERE course_id = $1 ORDER BY start_time, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn attempt_stats_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<ExamAttemptStats>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttemptStats>(
        "SELECT x.id AS exam_id, x.exam_type, x.weight_percentage, \
            AVG(a.score) AS average_score, COUNT(a.id) AS attempt_count \
         FROM exams x \
         LEFT JOIN exam_attempts a ON a.exam_id = x.id AND a.is_completed = TRUE \
         WHERE x.course_id = $1 \
         GROUP BY x.id, x.exam_type, x.weight_percentage, x.start_time \
         ORDER BY x.start_time, x.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn all_weights(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<ExamWeight>, sqlx::Error> {
    sqlx::query_as::<_, ExamWeight>(
        "SELECT id AS exam_id, course_id, weight_percentage FROM exams ORDER BY course_id, id",
    )
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) exam_type: &'a str,
    pub(crate) weight_percentage: f64,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateExam<'_>,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, course_id, exam_type, weight_percentage, start_time, end_time,
            duration_minutes, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.exam_type)
    .bind(params.weight_percentage)
    .bind(params.start_time)
    .bind(params.end_time)
    .bind(params.duration_minutes)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM exams").fetch_one(pool).await
}
