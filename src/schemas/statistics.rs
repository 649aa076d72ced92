use std::collections::BTreeMap;

use serde::Serialize;

use crate::repositories::exams::ExamAttemptStats;
use crate::services::scoring::round2;

#[derive(Debug, Serialize)]
pub(crate) struct CourseGradeResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) instructor_name: String,
    pub(crate) student_count: usize,
    pub(crate) average_grade: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentGradesResponse {
    pub(crate) id: String,
    pub(crate) student_number: String,
    pub(crate) full_name: String,
    /// Course code to grade; ungraded courses map to `null`.
    pub(crate) course_grades: BTreeMap<String, Option<f64>>,
    pub(crate) overall_average: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Totals {
    pub(crate) students: i64,
    pub(crate) courses: i64,
    pub(crate) exams: i64,
    pub(crate) completed_attempts: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseStatistics {
    pub(crate) course_id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) student_count: usize,
    pub(crate) graded_count: usize,
    pub(crate) average_grade: Option<f64>,
    pub(crate) min_grade: Option<f64>,
    pub(crate) max_grade: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DepartmentStatisticsResponse {
    pub(crate) totals: Totals,
    pub(crate) overall_average: Option<f64>,
    pub(crate) courses: Vec<CourseStatistics>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamStatisticsResponse {
    pub(crate) id: String,
    pub(crate) exam_type: String,
    pub(crate) weight_percentage: f64,
    pub(crate) average_score: f64,
    pub(crate) attempt_count: i64,
}

impl From<ExamAttemptStats> for ExamStatisticsResponse {
    fn from(stats: ExamAttemptStats) -> Self {
        Self {
            id: stats.exam_id,
            exam_type: stats.exam_type,
            weight_percentage: stats.weight_percentage,
            average_score: stats.average_score.map(round2).unwrap_or(0.0),
            attempt_count: stats.attempt_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailStudent {
    pub(crate) id: String,
    pub(crate) student_number: String,
    pub(crate) full_name: String,
    pub(crate) course_grade: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailsResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) instructor_name: String,
    pub(crate) exams: Vec<ExamStatisticsResponse>,
    pub(crate) students: Vec<CourseDetailStudent>,
}
