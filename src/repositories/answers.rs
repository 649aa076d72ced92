use time::PrimitiveDateTime;

use crate::db::models::GradedAnswer;

pub(crate) struct UpsertAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) attempt_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) selected_answer: &'a str,
    pub(crate) answered_at: PrimitiveDateTime,
}

/// A second answer to the same question replaces the first.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    params: UpsertAnswer<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO answers (id, attempt_id, question_id, selected_answer, answered_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (attempt_id, question_id)
         DO UPDATE SET selected_answer = EXCLUDED.selected_answer,
                       answered_at = EXCLUDED.answered_at",
    )
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_answer)
    .bind(params.answered_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn graded_for_attempt(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<GradedAnswer>, sqlx::Error> {
    sqlx::query_as::<_, GradedAnswer>(
        "SELECT a.question_id, a.selected_answer, q.correct_answer \
         FROM answers a LEFT JOIN questions q ON q.id = a.question_id \
         WHERE a.attempt_id = $1",
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}
