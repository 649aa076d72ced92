use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Student;

const COLUMNS: &str = "id, user_id, student_number, created_at";

/// A student row joined with its user account.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentProfile {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) student_number: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
}

const PROFILE_SELECT: &str = "\
    SELECT s.id, s.user_id, s.student_number, u.username, u.full_name \
    FROM students s JOIN users u ON u.id = s.user_id";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_number(
    executor: impl sqlx::PgExecutor<'_>,
    student_number: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE student_number = $1)")
        .bind(student_number)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_profiles(pool: &PgPool) -> Result<Vec<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(&format!("{PROFILE_SELECT} ORDER BY s.student_number"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn list_profiles_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(&format!(
        "{PROFILE_SELECT} JOIN enrollments e ON e.student_id = s.id \
         WHERE e.course_id = $1 ORDER BY s.student_number"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateStudent<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) student_number: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (id, user_id, student_number, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.student_number)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

/// Deletes the student together with its user account.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM users WHERE id = (SELECT user_id FROM students WHERE id = $1)")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM students").fetch_one(pool).await
}
