use std::collections::HashMap;

use crate::services::grades::{self, GradeKey};
use crate::services::scoring::{mean, round2};
use crate::services::store::ExamStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GradeSummary {
    pub(crate) graded_count: usize,
    pub(crate) average: Option<f64>,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
}

pub(crate) fn summarize(grades: &[f64]) -> GradeSummary {
    GradeSummary {
        graded_count: grades.len(),
        average: mean(grades).map(round2),
        min: grades.iter().copied().reduce(f64::min),
        max: grades.iter().copied().reduce(f64::max),
    }
}

/// All course grades, indexed by course and by student.
#[derive(Debug, Default)]
pub(crate) struct GradeBook {
    grades: HashMap<GradeKey, f64>,
    by_course: HashMap<String, Vec<f64>>,
    by_student: HashMap<String, Vec<f64>>,
}

impl GradeBook {
    pub(crate) fn from_grades(grades: HashMap<GradeKey, f64>) -> Self {
        let mut by_course: HashMap<String, Vec<f64>> = HashMap::new();
        let mut by_student: HashMap<String, Vec<f64>> = HashMap::new();

        for ((student_id, course_id), grade) in &grades {
            by_course.entry(course_id.clone()).or_default().push(*grade);
            by_student.entry(student_id.clone()).or_default().push(*grade);
        }

        Self { grades, by_course, by_student }
    }

    pub(crate) fn grade(&self, student_id: &str, course_id: &str) -> Option<f64> {
        self.grades.get(&(student_id.to_string(), course_id.to_string())).copied()
    }

    pub(crate) fn course_summary(&self, course_id: &str) -> GradeSummary {
        self.by_course.get(course_id).map(|grades| summarize(grades)).unwrap_or_default()
    }

    /// Mean of the student's graded courses, rounded.
    pub(crate) fn student_average(&self, student_id: &str) -> Option<f64> {
        self.by_student.get(student_id).and_then(|grades| mean(grades)).map(round2)
    }

    /// Mean over students of each student's own (unrounded) average, so every
    /// graded student weighs the same regardless of course load.
    pub(crate) fn overall_average(&self) -> Option<f64> {
        let per_student: Vec<f64> =
            self.by_student.values().filter_map(|grades| mean(grades)).collect();
        mean(&per_student).map(round2)
    }
}

pub(crate) async fn grade_book<S: ExamStore + ?Sized>(store: &S) -> Result<GradeBook, sqlx::Error> {
    Ok(GradeBook::from_grades(grades::all_course_grades(store).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, MemoryStore};

    fn key(student: &str, course: &str) -> GradeKey {
        (student.to_string(), course.to_string())
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert_eq!(summarize(&[]), GradeSummary::default());
    }

    #[test]
    fn summary_reports_spread() {
        let summary = summarize(&[24.0, 90.5, 61.25]);

        assert_eq!(summary.graded_count, 3);
        assert_eq!(summary.average, Some(58.58));
        assert_eq!(summary.min, Some(24.0));
        assert_eq!(summary.max, Some(90.5));
    }

    #[test]
    fn overall_average_weighs_students_equally() {
        let book = GradeBook::from_grades(HashMap::from([
            (key("stu-1", "c1"), 90.0),
            (key("stu-1", "c2"), 70.0),
            (key("stu-1", "c3"), 80.0),
            (key("stu-2", "c1"), 40.0),
        ]));

        assert_eq!(book.student_average("stu-1"), Some(80.0));
        assert_eq!(book.student_average("stu-2"), Some(40.0));
        assert_eq!(book.student_average("stu-3"), None);
        assert_eq!(book.overall_average(), Some(60.0));
        assert_eq!(book.course_summary("c1").average, Some(65.0));
        assert_eq!(book.course_summary("c9"), GradeSummary::default());
    }

    #[test]
    fn overall_average_uses_unrounded_student_means() {
        let book = GradeBook::from_grades(HashMap::from([
            (key("stu-1", "c1"), 10.0),
            (key("stu-1", "c2"), 10.0),
            (key("stu-1", "c3"), 10.01),
            (key("stu-2", "c1"), 10.0),
        ]));

        // stu-1 averages 10.00333..., displayed as 10.0
        assert_eq!(book.student_average("stu-1"), Some(10.0));
        assert_eq!(book.overall_average(), Some(10.0));
    }

    #[tokio::test]
    async fn grade_book_is_built_from_the_batch_grades() {
        let store = MemoryStore::default()
            .with_enrollment("stu-1", "course-1")
            .with_enrollment("stu-2", "course-1")
            .with_exam(test_support::exam("exam-1", "course-1", 50.0))
            .with_attempt(test_support::attempt("att-1", "stu-1", "exam-1", Some(80.0), true))
            .with_attempt(test_support::attempt("att-2", "stu-2", "exam-1", Some(60.0), true));

        let book = grade_book(&store).await.unwrap();

        assert_eq!(book.grade("stu-1", "course-1"), Some(40.0));
        assert_eq!(book.grade("stu-2", "course-1"), Some(30.0));
        assert_eq!(
            book.course_summary("course-1"),
            GradeSummary { graded_count: 2, average: Some(35.0), min: Some(30.0), max: Some(40.0) }
        );
        assert_eq!(book.overall_average(), Some(35.0));
    }
}
