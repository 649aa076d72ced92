use std::collections::HashMap;

use crate::db::models::{EnrollmentPair, ExamWeight, ScoredAttempt};
use crate::services::scoring::round2;
use crate::services::store::ExamStore;

/// `(student_id, course_id)`
pub(crate) type GradeKey = (String, String);

/// Sums `score * weight / 100` over the given `(exam_id, score, weight)`
/// contributions. The sum is not divided by the total weight: a partially
/// completed course yields its raw weighted sum. `None` when nothing
/// contributes or every contributing exam has zero weight.
pub(crate) fn weighted_grade<'a>(
    contributions: impl IntoIterator<Item = (&'a str, f64, f64)>,
) -> Option<f64> {
    let mut contributions: Vec<_> = contributions.into_iter().collect();
    if contributions.is_empty() {
        return None;
    }

    contributions.sort_by(|left, right| left.0.cmp(right.0));
    let (weighted, weight_sum) = contributions.iter().fold(
        (0.0_f64, 0.0_f64),
        |(weighted, weight_sum), (_, score, weight)| {
            (weighted + score * weight / 100.0, weight_sum + weight)
        },
    );
    if weight_sum == 0.0 {
        return None;
    }
    Some(round2(weighted))
}

/// Course grade for one student, from their completed and scored attempts.
pub(crate) async fn course_grade<S: ExamStore + ?Sized>(
    store: &S,
    student_id: &str,
    course_id: &str,
) -> Result<Option<f64>, sqlx::Error> {
    if !store.is_enrolled(student_id, course_id).await? {
        return Ok(None);
    }

    let exams = store.exams_for_course(course_id).await?;
    if exams.is_empty() {
        return Ok(None);
    }

    let scores: HashMap<String, f64> = store
        .completed_scores_for_student(student_id, course_id)
        .await?
        .into_iter()
        .map(|attempt| (attempt.exam_id, attempt.score))
        .collect();

    Ok(weighted_grade(exams.iter().filter_map(|exam| {
        scores.get(&exam.id).map(|score| (exam.id.as_str(), *score, exam.weight_percentage))
    })))
}

/// Grades for every enrolled pair that has one, in three store reads.
/// Pairs without a grade are absent from the map.
pub(crate) async fn all_course_grades<S: ExamStore + ?Sized>(
    store: &S,
) -> Result<HashMap<GradeKey, f64>, sqlx::Error> {
    let enrollments = store.all_enrollments().await?;
    let weights = store.all_exam_weights().await?;
    let scored = store.all_scored_attempts().await?;

    Ok(aggregate_grades(&enrollments, &weights, &scored))
}

pub(crate) fn aggregate_grades(
    enrollments: &[EnrollmentPair],
    weights: &[ExamWeight],
    scored: &[ScoredAttempt],
) -> HashMap<GradeKey, f64> {
    let mut exams_by_course: HashMap<&str, Vec<&ExamWeight>> = HashMap::new();
    for exam in weights {
        exams_by_course.entry(exam.course_id.as_str()).or_default().push(exam);
    }

    let scores: HashMap<(&str, &str), f64> = scored
        .iter()
        .map(|attempt| ((attempt.student_id.as_str(), attempt.exam_id.as_str()), attempt.score))
        .collect();

    let mut grades = HashMap::new();
    for pair in enrollments {
        let Some(exams) = exams_by_course.get(pair.course_id.as_str()) else {
            continue;
        };

        let grade = weighted_grade(exams.iter().filter_map(|exam| {
            scores
                .get(&(pair.student_id.as_str(), exam.exam_id.as_str()))
                .map(|score| (exam.exam_id.as_str(), *score, exam.weight_percentage))
        }));

        if let Some(grade) = grade {
            grades.insert((pair.student_id.clone(), pair.course_id.clone()), grade);
        }
    }

    grades
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::test_support::{self, MemoryStore};

    #[test]
    fn weighted_sum_is_not_normalized() {
        assert_eq!(weighted_grade([("e1", 80.0, 30.0)]), Some(24.0));
        assert_eq!(weighted_grade([("e1", 80.0, 30.0), ("e2", 50.0, 70.0)]), Some(59.0));
        assert_eq!(weighted_grade(std::iter::empty()), None);
    }

    #[test]
    fn zero_weight_contributions_yield_no_grade() {
        assert_eq!(weighted_grade([("quiz", 80.0, 0.0)]), None);
        assert_eq!(weighted_grade([("quiz", 80.0, 0.0), ("final", 50.0, 60.0)]), Some(30.0));
    }

    #[tokio::test]
    async fn zero_weight_exam_alone_is_ungraded_in_both_paths() {
        let store = MemoryStore::default()
            .with_enrollment("stu-1", "course-1")
            .with_exam(test_support::exam("quiz", "course-1", 0.0))
            .with_attempt(test_support::attempt("att-1", "stu-1", "quiz", Some(80.0), true));

        assert_eq!(course_grade(&store, "stu-1", "course-1").await.unwrap(), None);

        let batch = all_course_grades(&store).await.unwrap();
        assert!(batch.is_empty(), "{batch:?}");
    }

    #[tokio::test]
    async fn single_thirty_percent_exam() {
        let store = MemoryStore::default()
            .with_enrollment("stu-1", "course-1")
            .with_exam(test_support::exam("exam-1", "course-1", 30.0))
            .with_attempt(test_support::attempt("att-1", "stu-1", "exam-1", Some(80.0), true));

        assert_eq!(course_grade(&store, "stu-1", "course-1").await.unwrap(), Some(24.0));
    }

    #[tokio::test]
    async fn missing_pieces_yield_no_grade() {
        let store = MemoryStore::default()
            .with_enrollment("stu-1", "course-1")
            .with_enrollment("stu-1", "course-empty")
            .with_exam(test_support::exam("exam-1", "course-1", 40.0))
            .with_attempt(test_support::attempt("att-1", "stu-1", "exam-1", Some(70.0), false))
            .with_attempt(test_support::attempt("att-2", "stu-2", "exam-1", Some(90.0), true));

        // not enrolled, although a scored attempt exists
        assert_eq!(course_grade(&store, "stu-2", "course-1").await.unwrap(), None);
        // enrolled in a course without exams
        assert_eq!(course_grade(&store, "stu-1", "course-empty").await.unwrap(), None);
        // only an incomplete attempt
        assert_eq!(course_grade(&store, "stu-1", "course-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unscored_completed_attempt_is_skipped() {
        let store = MemoryStore::default()
            .with_enrollment("stu-1", "course-1")
            .with_exam(test_support::exam("exam-1", "course-1", 40.0))
            .with_exam(test_support::exam("exam-2", "course-1", 60.0))
            .with_attempt(test_support::attempt("att-1", "stu-1", "exam-1", None, true))
            .with_attempt(test_support::attempt("att-2", "stu-1", "exam-2", Some(55.5), true));

        assert_eq!(course_grade(&store, "stu-1", "course-1").await.unwrap(), Some(33.3));
    }

    #[tokio::test]
    async fn batch_matches_per_pair_on_random_fixture() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut store = MemoryStore::default();
        let students: Vec<String> = (0..12).map(|index| format!("stu-{index}")).collect();
        let courses: Vec<String> = (0..5).map(|index| format!("course-{index}")).collect();
        let mut exam_ids = Vec::new();

        for course in &courses {
            for index in 0..rng.gen_range(0..4) {
                let exam_id = format!("{course}-exam-{index}");
                let weight = f64::from(rng.gen_range(0..=100_u32));
                store = store.with_exam(test_support::exam(&exam_id, course, weight));
                exam_ids.push(exam_id);
            }
        }

        for student in &students {
            for course in &courses {
                if rng.gen_bool(0.6) {
                    store = store.with_enrollment(student, course);
                }
            }
            for exam_id in &exam_ids {
                if rng.gen_bool(0.5) {
                    let score = round2(rng.gen_range(0.0..=100.0));
                    let score = rng.gen_bool(0.9).then_some(score);
                    let completed = rng.gen_bool(0.8);
                    let attempt_id = format!("{student}-{exam_id}");
                    let attempt =
                        test_support::attempt(&attempt_id, student, exam_id, score, completed);
                    store = store.with_attempt(attempt);
                }
            }
        }

        let batch = all_course_grades(&store).await.unwrap();
        let mut graded_pairs = 0;

        for student in &students {
            for course in &courses {
                let single = course_grade(&store, student, course).await.unwrap();
                let key = (student.clone(), course.clone());
                assert_eq!(batch.get(&key).copied(), single, "{student} in {course}");
                graded_pairs += usize::from(single.is_some());
            }
        }

        assert_eq!(batch.len(), graded_pairs);
        assert!(graded_pairs > 0);
    }
}
