use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Exam, ExamAttempt, Question};
use crate::repositories::attempts::AttemptResult;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, message = "course_id is required"))]
    pub(crate) course_id: String,
    #[validate(length(min = 1, max = 50, message = "exam_type must be 1-50 characters"))]
    pub(crate) exam_type: String,
    #[validate(range(min = 0.0, max = 100.0, message = "weight_percentage must be between 0 and 100"))]
    pub(crate) weight_percentage: f64,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 600, message = "duration_minutes must be between 1 and 600"))]
    pub(crate) duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) exam_type: String,
    pub(crate) weight_percentage: f64,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: String,
}

impl From<Exam> for ExamResponse {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            course_id: exam.course_id,
            exam_type: exam.exam_type,
            weight_percentage: exam.weight_percentage,
            start_time: format_primitive(exam.start_time),
            end_time: format_primitive(exam.end_time),
            duration_minutes: exam.duration_minutes,
            created_at: format_primitive(exam.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InstructorExamResponse {
    #[serde(flatten)]
    pub(crate) exam: ExamResponse,
    pub(crate) question_count: i64,
    pub(crate) has_minimum_questions: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "exam_id is required"))]
    pub(crate) exam_id: String,
    #[validate(length(min = 1, message = "question_text is required"))]
    pub(crate) question_text: String,
    #[validate(length(min = 1, message = "option_a is required"))]
    pub(crate) option_a: String,
    #[validate(length(min = 1, message = "option_b is required"))]
    pub(crate) option_b: String,
    #[validate(length(min = 1, message = "option_c is required"))]
    pub(crate) option_c: String,
    #[validate(length(min = 1, message = "option_d is required"))]
    pub(crate) option_d: String,
    #[validate(length(min = 1, message = "option_e is required"))]
    pub(crate) option_e: String,
    pub(crate) correct_answer: String,
}

impl QuestionCreate {
    pub(crate) fn options(&self) -> [&str; 5] {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d, &self.option_e]
    }
}

/// Question with its answer key, for the instructor who owns it.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) option_e: String,
    pub(crate) correct_answer: String,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            exam_id: question.exam_id,
            question_text: question.question_text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
            option_e: question.option_e,
            correct_answer: question.correct_answer,
        }
    }
}

/// Question as served to a student: no answer key.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) id: String,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) option_e: String,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
            option_e: question.option_e,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionDeleteResponse {
    pub(crate) message: String,
    pub(crate) remaining_questions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
    pub(crate) score: Option<f64>,
    pub(crate) is_completed: bool,
}

impl From<ExamAttempt> for AttemptResponse {
    fn from(attempt: ExamAttempt) -> Self {
        Self {
            id: attempt.id,
            exam_id: attempt.exam_id,
            start_time: format_primitive(attempt.start_time),
            end_time: attempt.end_time.map(format_primitive),
            score: attempt.score,
            is_completed: attempt.is_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentExamResponse {
    #[serde(flatten)]
    pub(crate) exam: ExamResponse,
    pub(crate) is_available: bool,
    pub(crate) has_attempted: bool,
    pub(crate) attempt: Option<AttemptResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartExamResponse {
    pub(crate) attempt_id: String,
    pub(crate) exam: ExamResponse,
    pub(crate) questions: Vec<QuestionView>,
    pub(crate) duration_minutes: i32,
    pub(crate) start_time: String,
    pub(crate) resumed: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmitRequest {
    #[validate(length(min = 1, message = "answers must not be empty"))]
    pub(crate) answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AnswerSubmission {
    pub(crate) question_id: String,
    pub(crate) selected_answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) score: Option<f64>,
    pub(crate) exam_average: f64,
    pub(crate) attempt: AttemptResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultResponse {
    pub(crate) score: Option<f64>,
    pub(crate) exam_average: f64,
    pub(crate) exam: ExamResponse,
    pub(crate) attempt: AttemptResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResultResponse {
    pub(crate) attempt_id: String,
    pub(crate) student_id: String,
    pub(crate) student_number: String,
    pub(crate) student_name: String,
    pub(crate) score: Option<f64>,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
}

impl From<AttemptResult> for AttemptResultResponse {
    fn from(result: AttemptResult) -> Self {
        Self {
            attempt_id: result.attempt.id,
            student_id: result.attempt.student_id,
            student_number: result.student_number,
            student_name: result.student_name,
            score: result.attempt.score,
            start_time: format_primitive(result.attempt.start_time),
            end_time: result.attempt.end_time.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultsResponse {
    pub(crate) exam: ExamResponse,
    pub(crate) results: Vec<AttemptResultResponse>,
    pub(crate) exam_average: f64,
    pub(crate) total_attempts: usize,
}
