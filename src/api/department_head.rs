use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentDepartmentHead;
use crate::core::state::AppState;
use crate::db::models::EnrollmentPair;
use crate::repositories;
use crate::schemas::statistics::{
    CourseDetailStudent, CourseDetailsResponse, CourseGradeResponse, CourseStatistics,
    DepartmentStatisticsResponse, ExamStatisticsResponse, StudentGradesResponse, Totals,
};
use crate::services::{grades, statistics};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:id/details", get(course_details))
        .route("/students", get(list_students))
        .route("/statistics", get(department_statistics))
}

#[derive(Debug, Default)]
struct EnrollmentIndex {
    students_per_course: HashMap<String, usize>,
    courses_per_student: HashMap<String, Vec<String>>,
}

impl EnrollmentIndex {
    fn new(pairs: Vec<EnrollmentPair>) -> Self {
        let mut index = Self::default();
        for pair in pairs {
            *index.students_per_course.entry(pair.course_id.clone()).or_default() += 1;
            index.courses_per_student.entry(pair.student_id).or_default().push(pair.course_id);
        }
        index
    }

    fn student_count(&self, course_id: &str) -> usize {
        self.students_per_course.get(course_id).copied().unwrap_or(0)
    }

    fn courses_of(&self, student_id: &str) -> &[String] {
        self.courses_per_student.get(student_id).map(Vec::as_slice).unwrap_or_default()
    }
}

async fn enrollment_index(state: &AppState) -> Result<EnrollmentIndex, ApiError> {
    let pairs = repositories::enrollments::all_pairs(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load enrollments"))?;
    Ok(EnrollmentIndex::new(pairs))
}

async fn load_grade_book(state: &AppState) -> Result<statistics::GradeBook, ApiError> {
    statistics::grade_book(&state.store())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute course grades"))
}

async fn list_courses(
    State(state): State<AppState>,
    _current: CurrentDepartmentHead,
) -> Result<Json<Vec<CourseGradeResponse>>, ApiError> {
    let courses = repositories::courses::list_overviews(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    let book = load_grade_book(&state).await?;
    let enrollments = enrollment_index(&state).await?;

    Ok(Json(
        courses
            .into_iter()
            .map(|course| CourseGradeResponse {
                student_count: enrollments.student_count(&course.id),
                average_grade: book.course_summary(&course.id).average,
                id: course.id,
                code: course.code,
                name: course.name,
                instructor_name: course.instructor_name,
            })
            .collect(),
    ))
}

async fn list_students(
    State(state): State<AppState>,
    _current: CurrentDepartmentHead,
) -> Result<Json<Vec<StudentGradesResponse>>, ApiError> {
    let students = repositories::students::list_profiles(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;
    let courses = repositories::courses::list_overviews(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    let codes: HashMap<&str, &str> =
        courses.iter().map(|course| (course.id.as_str(), course.code.as_str())).collect();
    let book = load_grade_book(&state).await?;
    let enrollments = enrollment_index(&state).await?;

    let response = students
        .into_iter()
        .map(|student| {
            let course_grades: BTreeMap<String, Option<f64>> = enrollments
                .courses_of(&student.id)
                .iter()
                .filter_map(|course_id| {
                    codes.get(course_id.as_str()).map(|code| {
                        ((*code).to_string(), book.grade(&student.id, course_id))
                    })
                })
                .collect();

            StudentGradesResponse {
                overall_average: book.student_average(&student.id),
                course_grades,
                id: student.id,
                student_number: student.student_number,
                full_name: student.full_name,
            }
        })
        .collect();

    Ok(Json(response))
}

async fn department_statistics(
    State(state): State<AppState>,
    current: CurrentDepartmentHead,
) -> Result<Json<DepartmentStatisticsResponse>, ApiError> {
    let db = state.db();
    let totals = Totals {
        students: repositories::students::count(db)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count students"))?,
        courses: repositories::courses::count(db)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count courses"))?,
        exams: repositories::exams::count(db)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count exams"))?,
        completed_attempts: repositories::attempts::count_completed(db)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count attempts"))?,
    };

    let courses = repositories::courses::list_overviews(db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    let book = load_grade_book(&state).await?;
    let enrollments = enrollment_index(&state).await?;

    let courses = courses
        .into_iter()
        .map(|course| {
            let summary = book.course_summary(&course.id);
            CourseStatistics {
                student_count: enrollments.student_count(&course.id),
                graded_count: summary.graded_count,
                average_grade: summary.average,
                min_grade: summary.min,
                max_grade: summary.max,
                course_id: course.id,
                code: course.code,
                name: course.name,
            }
        })
        .collect();

    tracing::debug!(
        user_id = %current.user.id,
        department = %current.head.department,
        "Department statistics requested"
    );

    Ok(Json(DepartmentStatisticsResponse {
        totals,
        overall_average: book.overall_average(),
        courses,
    }))
}

async fn course_details(
    State(state): State<AppState>,
    _current: CurrentDepartmentHead,
    Path(course_id): Path<String>,
) -> Result<Json<CourseDetailsResponse>, ApiError> {
    let course = repositories::courses::find_overview(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let exams = repositories::exams::attempt_stats_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam statistics"))?;
    let students = repositories::students::list_profiles_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course students"))?;

    let store = state.store();
    let mut detail_students = Vec::with_capacity(students.len());
    for student in students {
        let course_grade = grades::course_grade(&store, &student.id, &course.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to compute course grade"))?;
        detail_students.push(CourseDetailStudent {
            id: student.id,
            student_number: student.student_number,
            full_name: student.full_name,
            course_grade,
        });
    }

    Ok(Json(CourseDetailsResponse {
        id: course.id,
        code: course.code,
        name: course.name,
        instructor_name: course.instructor_name,
        exams: exams.into_iter().map(ExamStatisticsResponse::from).collect(),
        students: detail_students,
    }))
}
