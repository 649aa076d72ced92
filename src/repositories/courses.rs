use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Course;

const COLUMNS: &str = "id, code, name, instructor_id, created_at";

/// Course with its instructor's display name.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseOverview {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) instructor_id: String,
    pub(crate) instructor_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseCounts {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) exam_count: i64,
    pub(crate) student_count: i64,
}

const OVERVIEW_SELECT: &str = "\
    SELECT c.id, c.code, c.name, c.instructor_id, u.full_name AS instructor_name \
    FROM courses c \
    JOIN instructors i ON i.id = c.instructor_id \
    JOIN users u ON u.id = i.user_id";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_overview(
    pool: &PgPool,
    id: &str,
) -> Result<Option<CourseOverview>, sqlx::Error> {
    sqlx::query_as::<_, CourseOverview>(&format!("{OVERVIEW_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE code = $1"))
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_overviews(pool: &PgPool) -> Result<Vec<CourseOverview>, sqlx::Error> {
    sqlx::query_as::<_, CourseOverview>(&format!("{OVERVIEW_SELECT} ORDER BY c.code"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn list_overviews_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<CourseOverview>, sqlx::Error> {
    sqlx::query_as::<_, CourseOverview>(&format!(
        "{OVERVIEW_SELECT} JOIN enrollments e ON e.course_id = c.id \
         WHERE e.student_id = $1 ORDER BY c.code"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_counts_for_instructor(
    pool: &PgPool,
    instructor_id: &str,
) -> Result<Vec<CourseCounts>, sqlx::Error> {
    sqlx::query_as::<_, CourseCounts>(
        "SELECT c.id, c.code, c.name, \
            (SELECT COUNT(*) FROM exams x WHERE x.course_id = c.id) AS exam_count, \
            (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS student_count \
         FROM courses c WHERE c.instructor_id = $1 ORDER BY c.code",
    )
    .bind(instructor_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) code: &'a str,
    pub(crate) name: &'a str,
    pub(crate) instructor_id: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Returns `None` when the course code is already taken.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateCourse<'_>,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, code, name, instructor_id, created_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (code) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.code)
    .bind(params.name)
    .bind(params.instructor_id)
    .bind(params.created_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM courses").fetch_one(pool).await
}
