use time::PrimitiveDateTime;

use crate::db::models::{ExamAttempt, GradedAnswer};
use crate::services::store::ExamStore;

/// Rounds to two decimals, ties to even.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Arithmetic mean, summed in ascending order so the result does not depend
/// on input order.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
}

/// Percentage of correct answers among the answers on record. `None` when
/// nothing was answered. An answer whose question is gone counts as wrong.
pub(crate) fn score_answers(answers: &[GradedAnswer]) -> Option<f64> {
    if answers.is_empty() {
        return None;
    }

    let correct = answers.iter().filter(|answer| is_correct(answer)).count();
    Some(round2(100.0 * correct as f64 / answers.len() as f64))
}

fn is_correct(answer: &GradedAnswer) -> bool {
    answer
        .correct_answer
        .as_deref()
        .is_some_and(|correct| correct.trim().eq_ignore_ascii_case(answer.selected_answer.trim()))
}

pub(crate) async fn score<S: ExamStore + ?Sized>(
    store: &S,
    attempt_id: &str,
) -> Result<Option<f64>, sqlx::Error> {
    let answers = store.graded_answers(attempt_id).await?;
    Ok(score_answers(&answers))
}

/// Mean of completed scores for an exam, `0.0` when there are none.
pub(crate) fn exam_average(scores: &[f64]) -> f64 {
    mean(scores).map(round2).unwrap_or(0.0)
}

/// Scores the attempt, marks it completed at `now` and returns the stored row.
pub(crate) async fn finish_attempt<S: ExamStore + ?Sized>(
    store: &S,
    attempt_id: &str,
    now: PrimitiveDateTime,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    let score = score(store, attempt_id).await?;
    store.finalize_attempt(attempt_id, now, score, true).await?;
    store.find_attempt(attempt_id).await
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reconciled {
    Unchanged(ExamAttempt),
    /// Finalized or rescored from its stored answers.
    Scored(ExamAttempt),
    /// Abandoned before any answer was stored; the row is gone.
    Discarded,
}

/// Settles attempts left behind by an interrupted submission: an incomplete
/// attempt without answers is dropped, an incomplete one with answers is
/// finalized, and a completed one missing its score is rescored.
pub(crate) async fn reconcile_attempt<S: ExamStore + ?Sized>(
    store: &S,
    attempt: ExamAttempt,
    now: PrimitiveDateTime,
) -> Result<Reconciled, sqlx::Error> {
    if attempt.is_completed && attempt.score.is_some() {
        return Ok(Reconciled::Unchanged(attempt));
    }

    let answers = store.graded_answers(&attempt.id).await?;

    if !attempt.is_completed && answers.is_empty() {
        store.discard_attempt(&attempt.id).await?;
        tracing::info!(attempt_id = %attempt.id, "Discarded abandoned attempt without answers");
        return Ok(Reconciled::Discarded);
    }

    let score = score_answers(&answers);
    let end_time = attempt.end_time.unwrap_or(now);
    store.finalize_attempt(&attempt.id, end_time, score, true).await?;
    tracing::info!(attempt_id = %attempt.id, score = ?score, "Finalized stale attempt");

    Ok(Reconciled::Scored(ExamAttempt {
        end_time: Some(end_time),
        score,
        is_completed: true,
        ..attempt
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, MemoryStore};

    fn graded(selected: &str, correct: Option<&str>) -> GradedAnswer {
        GradedAnswer {
            question_id: correct.map(|_| format!("q-{selected}")),
            selected_answer: selected.to_string(),
            correct_answer: correct.map(str::to_string),
        }
    }

    #[test]
    fn no_answers_has_no_score() {
        assert_eq!(score_answers(&[]), None);
    }

    #[test]
    fn all_correct_and_all_wrong() {
        let correct = vec![graded("A", Some("A")), graded("c", Some("C")), graded("E", Some("e"))];
        let wrong = vec![graded("B", Some("A")), graded("D", Some("C"))];

        assert_eq!(score_answers(&correct), Some(100.0));
        assert_eq!(score_answers(&wrong), Some(0.0));
    }

    #[test]
    fn two_of_three_rounds_to_two_decimals() {
        let answers = vec![graded("A", Some("A")), graded("B", Some("B")), graded("C", Some("D"))];
        assert_eq!(score_answers(&answers), Some(66.67));
    }

    #[test]
    fn order_of_answers_does_not_matter() {
        let mut answers = vec![
            graded("A", Some("A")),
            graded("B", Some("C")),
            graded("D", Some("D")),
            graded("E", None),
            graded("b", Some("B")),
        ];
        let expected = score_answers(&answers);

        answers.reverse();
        assert_eq!(score_answers(&answers), expected);
        answers.swap(0, 3);
        assert_eq!(score_answers(&answers), expected);
        assert_eq!(expected, Some(60.0));
    }

    #[test]
    fn orphaned_answer_counts_against_the_attempt() {
        let answers = vec![graded("A", Some("A")), graded("A", None)];
        assert_eq!(score_answers(&answers), Some(50.0));
    }

    #[test]
    fn round2_ties_to_even() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(24.0), 24.0);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn exam_average_defaults_to_zero() {
        assert_eq!(exam_average(&[]), 0.0);
        assert_eq!(exam_average(&[80.0, 60.0, 100.0]), 80.0);
        assert_eq!(exam_average(&[100.0, 0.0, 0.0]), 33.33);
    }

    #[tokio::test]
    async fn score_reads_stored_answers() {
        let store = MemoryStore::default()
            .with_question(test_support::question("q1", "exam-1", "A"))
            .with_question(test_support::question("q2", "exam-1", "B"))
            .with_question(test_support::question("q3", "exam-1", "C"))
            .with_attempt(test_support::attempt("att-1", "stu-1", "exam-1", None, false))
            .with_answer("att-1", "q1", "a")
            .with_answer("att-1", "q2", "B")
            .with_answer("att-1", "q3", "E");

        assert_eq!(score(&store, "att-1").await.unwrap(), Some(66.67));
        assert_eq!(score(&store, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn finish_attempt_marks_completion() {
        let now = test_support::at(2025, 3, 1, 10, 5, 0);
        let store = MemoryStore::default()
            .with_question(test_support::question("q1", "exam-1", "A"))
            .with_attempt(test_support::attempt("att-1", "stu-1", "exam-1", None, false))
            .with_answer("att-1", "q1", "A");

        let finished = finish_attempt(&store, "att-1", now).await.unwrap().expect("attempt");
        let stored = store.attempt_snapshot("att-1").expect("attempt");

        assert_eq!(finished, stored);
        assert!(stored.is_completed);
        assert_eq!(stored.score, Some(100.0));
        assert_eq!(stored.end_time, Some(now));
    }

    #[tokio::test]
    async fn reconcile_discards_empty_incomplete_attempt() {
        let now = test_support::at(2025, 3, 1, 10, 5, 0);
        let attempt = test_support::attempt("att-1", "stu-1", "exam-1", None, false);
        let store = MemoryStore::default().with_attempt(attempt.clone());

        let outcome = reconcile_attempt(&store, attempt, now).await.unwrap();

        assert_eq!(outcome, Reconciled::Discarded);
        assert!(store.attempt_snapshot("att-1").is_none());
    }

    #[tokio::test]
    async fn reconcile_finalizes_incomplete_attempt_with_answers() {
        let now = test_support::at(2025, 3, 1, 10, 5, 0);
        let attempt = test_support::attempt("att-1", "stu-1", "exam-1", None, false);
        let store = MemoryStore::default()
            .with_question(test_support::question("q1", "exam-1", "A"))
            .with_question(test_support::question("q2", "exam-1", "B"))
            .with_attempt(attempt.clone())
            .with_answer("att-1", "q1", "A")
            .with_answer("att-1", "q2", "C");

        let outcome = reconcile_attempt(&store, attempt, now).await.unwrap();

        let Reconciled::Scored(updated) = outcome else {
            panic!("expected scored attempt, got {outcome:?}");
        };
        assert_eq!(updated.score, Some(50.0));
        assert_eq!(updated.end_time, Some(now));
        assert_eq!(store.attempt_snapshot("att-1"), Some(updated));
    }

    #[tokio::test]
    async fn reconcile_rescores_completed_attempt_without_score() {
        let now = test_support::at(2025, 3, 1, 10, 5, 0);
        let ended = test_support::at(2025, 3, 1, 9, 59, 0);
        let mut attempt = test_support::attempt("att-1", "stu-1", "exam-1", None, true);
        attempt.end_time = Some(ended);
        let store = MemoryStore::default()
            .with_question(test_support::question("q1", "exam-1", "D"))
            .with_attempt(attempt.clone())
            .with_answer("att-1", "q1", "d");

        let outcome = reconcile_attempt(&store, attempt, now).await.unwrap();

        let Reconciled::Scored(updated) = outcome else {
            panic!("expected scored attempt, got {outcome:?}");
        };
        assert_eq!(updated.score, Some(100.0));
        assert_eq!(updated.end_time, Some(ended));
    }

    #[tokio::test]
    async fn reconcile_leaves_scored_attempt_alone() {
        let now = test_support::at(2025, 3, 1, 10, 5, 0);
        let attempt = test_support::attempt("att-1", "stu-1", "exam-1", Some(40.0), true);
        let store = MemoryStore::default().with_attempt(attempt.clone());

        let outcome = reconcile_attempt(&store, attempt.clone(), now).await.unwrap();

        assert_eq!(outcome, Reconciled::Unchanged(attempt));
    }
}
