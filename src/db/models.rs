use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::UserRole;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Student {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) student_number: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Instructor {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) department: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct DepartmentHead {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) department: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) instructor_id: String,
    pub(crate) created_at: PrimitiveDateTime,
}

/// A timed exam. `start_time` and `end_time` are UTC.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) exam_type: String,
    pub(crate) weight_percentage: f64,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) option_e: String,
    pub(crate) correct_answer: String,
    pub(crate) created_at: PrimitiveDateTime,
}

impl Question {
    pub(crate) fn options(&self) -> [&str; 5] {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d, &self.option_e]
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct ExamAttempt {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: Option<PrimitiveDateTime>,
    pub(crate) score: Option<f64>,
    pub(crate) is_completed: bool,
}

/// A stored answer joined with the correct label of its question, if the
/// question still exists.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub(crate) struct GradedAnswer {
    pub(crate) question_id: Option<String>,
    pub(crate) selected_answer: String,
    pub(crate) correct_answer: Option<String>,
}

/// Exam weight as seen by the grade aggregators.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct ExamWeight {
    pub(crate) exam_id: String,
    pub(crate) course_id: String,
    pub(crate) weight_percentage: f64,
}

/// Score of a completed attempt that has one.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct ScoredAttempt {
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow)]
pub(crate) struct EnrollmentPair {
    pub(crate) student_id: String,
    pub(crate) course_id: String,
}
