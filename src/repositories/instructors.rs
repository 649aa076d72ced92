use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Instructor;

const COLUMNS: &str = "id, user_id, department, created_at";

#[derive(Debug, Clone, FromRow)]
pub(crate) struct InstructorProfile {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) department: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!("SELECT {COLUMNS} FROM instructors WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "SELECT {COLUMNS} FROM instructors WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_profiles(pool: &PgPool) -> Result<Vec<InstructorProfile>, sqlx::Error> {
    sqlx::query_as::<_, InstructorProfile>(
        "SELECT i.id, i.user_id, i.department, u.username, u.full_name \
         FROM instructors i JOIN users u ON u.id = i.user_id \
         ORDER BY u.full_name",
    )
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateInstructor<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) department: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateInstructor<'_>,
) -> Result<Instructor, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "INSERT INTO instructors (id, user_id, department, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.department)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

/// Deletes the instructor, its user account and, by cascade, its courses.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM users WHERE id = (SELECT user_id FROM instructors WHERE id = $1)")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
