use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::DepartmentHead;

const COLUMNS: &str = "id, user_id, department, created_at";

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<DepartmentHead>, sqlx::Error> {
    sqlx::query_as::<_, DepartmentHead>(&format!(
        "SELECT {COLUMNS} FROM department_heads WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateDepartmentHead<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) department: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateDepartmentHead<'_>,
) -> Result<DepartmentHead, sqlx::Error> {
    sqlx::query_as::<_, DepartmentHead>(&format!(
        "INSERT INTO department_heads (id, user_id, department, created_at)
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
