use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::EnrollmentPair;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct EnrollmentDetail {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) student_number: String,
    pub(crate) student_name: String,
    pub(crate) course_code: String,
    pub(crate) course_name: String,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

const DETAIL_SELECT: &str = "\
    SELECT e.id, e.student_id, e.course_id, s.student_number, u.full_name AS student_name, \
        c.code AS course_code, c.name AS course_name, e.enrolled_at \
    FROM enrollments e \
    JOIN students s ON s.id = e.student_id \
    JOIN users u ON u.id = s.user_id \
    JOIN courses c ON c.id = e.course_id";

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_details(pool: &PgPool) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentDetail>(&format!(
        "{DETAIL_SELECT} ORDER BY c.code, s.student_number"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_detail(
    pool: &PgPool,
    id: &str,
) -> Result<Option<EnrollmentDetail>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentDetail>(&format!("{DETAIL_SELECT} WHERE e.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn course_ids_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT course_id FROM enrollments WHERE student_id = $1")
        .bind(student_id)
        .fetch_all(pool)
        .await
}

pub(crate) async fn all_pairs(pool: &PgPool) -> Result<Vec<EnrollmentPair>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentPair>("SELECT student_id, course_id FROM enrollments")
        .fetch_all(pool)
        .await
}

pub(crate) struct CreateEnrollment<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

/// Returns `false` when the student is already enrolled.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateEnrollment<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO enrollments (id, student_id, course_id, enrolled_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (student_id, course_id) DO NOTHING",
    )
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.enrolled_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM enrollments WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
