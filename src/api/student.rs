use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_enrollment, CurrentStudent};
use crate::api::validation::option_label;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::{Exam, ExamAttempt};
use crate::repositories;
use crate::schemas::course::StudentCourseResponse;
use crate::schemas::exam::{
    AttemptResponse, ExamResponse, ExamResultResponse, QuestionView, StartExamResponse,
    StudentExamResponse, SubmitRequest, SubmitResponse,
};
use crate::services::availability::{self, ExamWindow};
use crate::services::question_sampler;
use crate::services::scoring::{self, Reconciled};
use crate::services::{grades, store::ExamStore};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:id/exams", get(course_exams))
        .route("/exams/:id/start", post(start_exam))
        .route("/exams/:id/submit", post(submit_exam))
        .route("/exams/:id/result", get(exam_result))
}

async fn load_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

async fn exam_average(state: &AppState, exam_id: &str) -> Result<f64, ApiError> {
    let scores = repositories::attempts::completed_scores_for_exam(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam scores"))?;
    Ok(scoring::exam_average(&scores))
}

async fn list_courses(
    State(state): State<AppState>,
    current: CurrentStudent,
) -> Result<Json<Vec<StudentCourseResponse>>, ApiError> {
    let courses = repositories::courses::list_overviews_for_student(state.db(), &current.student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    let store = state.store();
    let mut response = Vec::with_capacity(courses.len());
    for course in courses {
        let course_grade = grades::course_grade(&store, &current.student.id, &course.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to compute course grade"))?;
        response.push(StudentCourseResponse {
            id: course.id,
            code: course.code,
            name: course.name,
            instructor_name: course.instructor_name,
            course_grade,
        });
    }

    Ok(Json(response))
}

async fn course_exams(
    State(state): State<AppState>,
    current: CurrentStudent,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<StudentExamResponse>>, ApiError> {
    require_enrollment(&state, &current.student, &course_id).await?;

    let exams = repositories::exams::list_with_question_counts(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let min_pool = state.settings().exam().min_question_pool;
    let store = state.store();
    let now = primitive_now_utc();

    let mut response = Vec::new();
    for row in exams {
        if usize::try_from(row.question_count).map_or(true, |count| count < min_pool) {
            continue;
        }

        let attempt = store
            .find_attempt_for(&current.student.id, &row.exam.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;

        let attempt = match attempt {
            Some(attempt) => match scoring::reconcile_attempt(&store, attempt, now)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to reconcile attempt"))?
            {
                Reconciled::Unchanged(attempt) | Reconciled::Scored(attempt) => Some(attempt),
                Reconciled::Discarded => None,
            },
            None => None,
        };

        response.push(StudentExamResponse {
            is_available: availability::is_available(&row.exam, now),
            has_attempted: attempt.is_some(),
            attempt: attempt.map(AttemptResponse::from),
            exam: ExamResponse::from(row.exam),
        });
    }

    Ok(Json(response))
}

/// Returns the attempt to work on and whether it already existed.
async fn open_attempt(
    state: &AppState,
    student_id: &str,
    exam_id: &str,
    existing: Option<ExamAttempt>,
) -> Result<(ExamAttempt, bool), ApiError> {
    if let Some(attempt) = existing {
        return Ok((attempt, true));
    }

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    let created = repositories::attempts::create(
        &mut *tx,
        repositories::attempts::CreateAttempt {
            id: &Uuid::new_v4().to_string(),
            student_id,
            exam_id,
            start_time: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create attempt"))?;

    let attempt = repositories::attempts::find_for(&mut *tx, student_id, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::internal("attempt missing after insert", "Failed to fetch attempt"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit attempt"))?;

    if attempt.is_completed {
        return Err(ApiError::BadRequest("You have already completed this exam".to_string()));
    }

    Ok((attempt, !created))
}

async fn start_exam(
    State(state): State<AppState>,
    current: CurrentStudent,
    Path(exam_id): Path<String>,
) -> Result<Json<StartExamResponse>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;
    require_enrollment(&state, &current.student, &exam.course_id).await?;

    match availability::exam_window(&exam, primitive_now_utc()) {
        ExamWindow::NotStarted => {
            return Err(ApiError::BadRequest(format!(
                "Exam has not started yet. Start time: {}",
                format_primitive(exam.start_time)
            )));
        }
        ExamWindow::Closed => {
            return Err(ApiError::BadRequest(format!(
                "Exam has ended. End time: {}",
                format_primitive(exam.end_time)
            )));
        }
        ExamWindow::Open => {}
    }

    let store = state.store();
    let existing = store
        .find_attempt_for(&current.student.id, &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;
    if existing.as_ref().is_some_and(|attempt| attempt.is_completed) {
        return Err(ApiError::BadRequest("You have already completed this exam".to_string()));
    }

    let exam_settings = state.settings().exam();
    let pool_size = repositories::questions::count_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
    if usize::try_from(pool_size).map_or(true, |size| size < exam_settings.min_question_pool) {
        return Err(ApiError::BadRequest(format!(
            "The exam needs at least {} questions before it can be started",
            exam_settings.min_question_pool
        )));
    }

    let (attempt, resumed) = open_attempt(&state, &current.student.id, &exam.id, existing).await?;

    let mut rng = StdRng::seed_from_u64(rand::random());
    let selection = question_sampler::questions_for_attempt(
        &store,
        &exam.id,
        resumed.then_some(attempt.id.as_str()),
        exam_settings.questions_per_attempt,
        &mut rng,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to select questions"))?;

    metrics::attempt_started(resumed);
    tracing::info!(
        attempt_id = %attempt.id,
        exam_id = %exam.id,
        user_id = %current.user.id,
        resumed,
        source = ?selection.source,
        "Exam attempt started"
    );

    Ok(Json(StartExamResponse {
        attempt_id: attempt.id,
        duration_minutes: exam.duration_minutes,
        start_time: format_primitive(attempt.start_time),
        questions: selection.questions.into_iter().map(QuestionView::from).collect(),
        exam: ExamResponse::from(exam),
        resumed,
    }))
}

async fn submit_exam(
    State(state): State<AppState>,
    current: CurrentStudent,
    Path(exam_id): Path<String>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = load_exam(&state, &exam_id).await?;
    let store = state.store();

    let attempt = store
        .find_attempt_for(&current.student.id, &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .filter(|attempt| !attempt.is_completed)
        .ok_or_else(|| ApiError::NotFound("No active exam attempt found".to_string()))?;

    let exam_questions: HashSet<String> = store
        .questions_for_exam(&exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?
        .into_iter()
        .map(|question| question.id)
        .collect();

    let mut answers = Vec::with_capacity(payload.answers.len());
    for answer in &payload.answers {
        if !exam_questions.contains(&answer.question_id) {
            return Err(ApiError::BadRequest(format!(
                "Question {} does not belong to this exam",
                answer.question_id
            )));
        }
        answers.push((answer.question_id.as_str(), option_label(&answer.selected_answer)?));
    }

    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;
    for (question_id, selected_answer) in &answers {
        repositories::answers::upsert(
            &mut *tx,
            repositories::answers::UpsertAnswer {
                id: &Uuid::new_v4().to_string(),
                attempt_id: &attempt.id,
                question_id,
                selected_answer,
                answered_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save answer"))?;
    }
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit answers"))?;

    let finished = scoring::finish_attempt(&store, &attempt.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to finalize attempt"))?
        .ok_or_else(|| ApiError::NotFound("No active exam attempt found".to_string()))?;

    metrics::attempt_submitted(finished.score);
    tracing::info!(
        attempt_id = %finished.id,
        exam_id = %exam.id,
        score = ?finished.score,
        answers = answers.len(),
        "Exam attempt submitted"
    );

    Ok(Json(SubmitResponse {
        score: finished.score,
        exam_average: exam_average(&state, &exam.id).await?,
        attempt: AttemptResponse::from(finished),
    }))
}

async fn exam_result(
    State(state): State<AppState>,
    current: CurrentStudent,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamResultResponse>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;

    let attempt = state
        .store()
        .find_attempt_for(&current.student.id, &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .filter(|attempt| attempt.is_completed)
        .ok_or_else(|| ApiError::NotFound("No completed exam attempt found".to_string()))?;

    Ok(Json(ExamResultResponse {
        score: attempt.score,
        exam_average: exam_average(&state, &exam.id).await?,
        exam: ExamResponse::from(exam),
        attempt: AttemptResponse::from(attempt),
    }))
}
