use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentInstructor};
use crate::api::validation::{option_label, validate_distinct_options};
use crate::core::state::AppState;
use crate::core::time::{parse_utc, primitive_now_utc};
use crate::db::models::{Exam, Instructor};
use crate::repositories;
use crate::schemas::course::{CourseStudentResponse, InstructorCourseResponse};
use crate::schemas::exam::{
    AttemptResultResponse, ExamCreate, ExamResponse, ExamResultsResponse, InstructorExamResponse,
    QuestionCreate, QuestionDeleteResponse, QuestionResponse,
};
use crate::schemas::MessageResponse;
use crate::services::{availability, grades, scoring};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:id/students", get(course_students))
        .route("/courses/:id/exams", get(course_exams))
        .route("/exams", post(create_exam))
        .route("/exams/:id", delete(delete_exam))
        .route("/exams/:id/questions", get(exam_questions))
        .route("/exams/:id/results", get(exam_results))
        .route("/questions", post(create_question))
        .route("/questions/:id", delete(delete_question))
}

async fn load_owned_exam(
    state: &AppState,
    instructor: &Instructor,
    exam_id: &str,
) -> Result<Exam, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    require_course_owner(state, instructor, &exam.course_id).await?;
    Ok(exam)
}

fn ensure_editable(exam: &Exam) -> Result<(), ApiError> {
    if availability::is_editable(exam, primitive_now_utc()) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Questions cannot be changed once the exam has started".to_string()))
    }
}

async fn list_courses(
    State(state): State<AppState>,
    current: CurrentInstructor,
) -> Result<Json<Vec<InstructorCourseResponse>>, ApiError> {
    let courses =
        repositories::courses::list_counts_for_instructor(state.db(), &current.instructor.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(InstructorCourseResponse::from).collect()))
}

async fn course_students(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseStudentResponse>>, ApiError> {
    require_course_owner(&state, &current.instructor, &course_id).await?;

    let students = repositories::students::list_profiles_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course students"))?;

    let store = state.store();
    let mut response = Vec::with_capacity(students.len());
    for student in students {
        let course_grade = grades::course_grade(&store, &student.id, &course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to compute course grade"))?;
        response.push(CourseStudentResponse {
            id: student.id,
            student_number: student.student_number,
            full_name: student.full_name,
            course_grade,
        });
    }

    Ok(Json(response))
}

async fn course_exams(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<InstructorExamResponse>>, ApiError> {
    require_course_owner(&state, &current.instructor, &course_id).await?;

    let exams = repositories::exams::list_with_question_counts(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let min_pool = state.settings().exam().min_question_pool;

    Ok(Json(
        exams
            .into_iter()
            .map(|row| InstructorExamResponse {
                has_minimum_questions: usize::try_from(row.question_count)
                    .is_ok_and(|count| count >= min_pool),
                question_count: row.question_count,
                exam: ExamResponse::from(row.exam),
            })
            .collect(),
    ))
}

async fn create_exam(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    require_course_owner(&state, &current.instructor, &payload.course_id).await?;

    let start_time = parse_utc(&payload.start_time)?;
    let end_time = parse_utc(&payload.end_time)?;
    if end_time <= start_time {
        return Err(ApiError::BadRequest("end_time must be after start_time".to_string()));
    }

    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            exam_type: payload.exam_type.trim(),
            weight_percentage: payload.weight_percentage,
            start_time,
            end_time,
            duration_minutes: payload
                .duration_minutes
                .unwrap_or(state.settings().exam().default_duration_minutes),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    tracing::info!(
        exam_id = %exam.id,
        course_id = %exam.course_id,
        created_by = %current.user.id,
        "Created exam"
    );

    Ok((StatusCode::CREATED, Json(ExamResponse::from(exam))))
}

async fn delete_exam(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Path(exam_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let exam = load_owned_exam(&state, &current.instructor, &exam_id).await?;

    repositories::exams::delete(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    Ok(Json(MessageResponse::new("Exam deleted successfully")))
}

async fn create_question(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let correct_answer = option_label(&payload.correct_answer)?;

    let exam = load_owned_exam(&state, &current.instructor, &payload.exam_id).await?;
    ensure_editable(&exam)?;

    let duplicate = repositories::questions::text_exists(state.db(), &exam.id, &payload.question_text)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check question text"))?;
    if duplicate {
        return Err(ApiError::BadRequest("This question already exists in the exam".to_string()));
    }

    let options = payload.options();
    validate_distinct_options(&options)?;

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            exam_id: &exam.id,
            question_text: payload.question_text.trim(),
            options: options.map(str::trim),
            correct_answer: &correct_answer,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

async fn exam_questions(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Path(exam_id): Path<String>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let exam = load_owned_exam(&state, &current.instructor, &exam_id).await?;

    let questions = repositories::questions::list_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

async fn delete_question(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Path(question_id): Path<String>,
) -> Result<Json<QuestionDeleteResponse>, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let exam = load_owned_exam(&state, &current.instructor, &question.exam_id).await?;
    ensure_editable(&exam)?;

    repositories::questions::delete(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    let remaining = repositories::questions::count_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
    let min_pool = state.settings().exam().min_question_pool;
    let warning = usize::try_from(remaining).is_ok_and(|count| count < min_pool).then(|| {
        format!(
            "The exam now has {remaining} questions; students cannot start it until it has at least {min_pool}"
        )
    });

    Ok(Json(QuestionDeleteResponse {
        message: "Question deleted successfully".to_string(),
        remaining_questions: remaining,
        warning,
    }))
}

async fn exam_results(
    State(state): State<AppState>,
    current: CurrentInstructor,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamResultsResponse>, ApiError> {
    let exam = load_owned_exam(&state, &current.instructor, &exam_id).await?;

    let results = repositories::attempts::list_results(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list results"))?;
    let scores = repositories::attempts::completed_scores_for_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam scores"))?;

    Ok(Json(ExamResultsResponse {
        exam: ExamResponse::from(exam),
        total_attempts: results.len(),
        exam_average: scoring::exam_average(&scores),
        results: results.into_iter().map(AttemptResultResponse::from).collect(),
    }))
}
