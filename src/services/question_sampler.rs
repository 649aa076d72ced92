use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::models::Question;
use crate::services::store::ExamStore;

/// Draws `k` items uniformly without replacement. A pool smaller than `k` is
/// returned whole, in its original order.
pub(crate) fn sample<T: Clone, R: Rng + ?Sized>(pool: &[T], k: usize, rng: &mut R) -> Vec<T> {
    if pool.len() < k {
        return pool.to_vec();
    }

    pool.choose_multiple(rng, k).cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuestionSource {
    /// Recovered from answers already stored for the attempt.
    Resumed,
    Sampled,
}

#[derive(Debug)]
pub(crate) struct AttemptQuestions {
    pub(crate) questions: Vec<Question>,
    pub(crate) source: QuestionSource,
}

/// Picks the question set for an attempt. When `attempt_id` already has
/// answers on record those questions are served again instead of a new draw.
pub(crate) async fn questions_for_attempt<S, R>(
    store: &S,
    exam_id: &str,
    attempt_id: Option<&str>,
    k: usize,
    rng: &mut R,
) -> Result<AttemptQuestions, sqlx::Error>
where
    S: ExamStore + ?Sized,
    R: Rng + Send + ?Sized,
{
    if let Some(attempt_id) = attempt_id {
        let answered = store.answered_questions(attempt_id).await?;
        if !answered.is_empty() {
            return Ok(AttemptQuestions { questions: answered, source: QuestionSource::Resumed });
        }
    }

    let pool = store.questions_for_exam(exam_id).await?;
    Ok(AttemptQuestions { questions: sample(&pool, k, rng), source: QuestionSource::Sampled })
}
