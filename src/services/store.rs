use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{
    EnrollmentPair, Exam, ExamAttempt, ExamWeight, GradedAnswer, Question, ScoredAttempt,
};
use crate::repositories;

/// Read/write surface the grading services need from persistence.
#[async_trait]
pub(crate) trait ExamStore: Send + Sync {
    async fn questions_for_exam(&self, exam_id: &str) -> Result<Vec<Question>, sqlx::Error>;

    async fn find_attempt(&self, attempt_id: &str) -> Result<Option<ExamAttempt>, sqlx::Error>;

    async fn find_attempt_for(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<Option<ExamAttempt>, sqlx::Error>;

    async fn graded_answers(&self, attempt_id: &str) -> Result<Vec<GradedAnswer>, sqlx::Error>;

    async fn answered_questions(&self, attempt_id: &str) -> Result<Vec<Question>, sqlx::Error>;

    async fn exams_for_course(&self, course_id: &str) -> Result<Vec<Exam>, sqlx::Error>;

    async fn is_enrolled(&self, student_id: &str, course_id: &str) -> Result<bool, sqlx::Error>;

    /// Completed attempts with a score, for one student within one course.
    async fn completed_scores_for_student(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Vec<ScoredAttempt>, sqlx::Error>;

    async fn finalize_attempt(
        &self,
        attempt_id: &str,
        end_time: PrimitiveDateTime,
        score: Option<f64>,
        completed: bool,
    ) -> Result<(), sqlx::Error>;

    async fn discard_attempt(&self, attempt_id: &str) -> Result<(), sqlx::Error>;

    async fn all_enrollments(&self) -> Result<Vec<EnrollmentPair>, sqlx::Error>;

    async fn all_exam_weights(&self) -> Result<Vec<ExamWeight>, sqlx::Error>;

    async fn all_scored_attempts(&self) -> Result<Vec<ScoredAttempt>, sqlx::Error>;
}

/// [`ExamStore`] over the Postgres repositories.
#[derive(Clone, Copy)]
pub(crate) struct PgStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgStore<'a> {
    pub(crate) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamStore for PgStore<'_> {
    async fn questions_for_exam(&self, exam_id: &str) -> Result<Vec<Question>, sqlx::Error> {
        repositories::questions::list_by_exam(self.pool, exam_id).await
    }

    async fn find_attempt(&self, attempt_id: &str) -> Result<Option<ExamAttempt>, sqlx::Error> {
        repositories::attempts::find_by_id(self.pool, attempt_id).await
    }

    async fn find_attempt_for(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<Option<ExamAttempt>, sqlx::Error> {
        repositories::attempts::find_for(self.pool, student_id, exam_id).await
    }

    async fn graded_answers(&self, attempt_id: &str) -> Result<Vec<GradedAnswer>, sqlx::Error> {
        repositories::answers::graded_for_attempt(self.pool, attempt_id).await
    }

    async fn answered_questions(&self, attempt_id: &str) -> Result<Vec<Question>, sqlx::Error> {
        repositories::questions::list_answered(self.pool, attempt_id).await
    }

    async fn exams_for_course(&self, course_id: &str) -> Result<Vec<Exam>, sqlx::Error> {
        repositories::exams::list_by_course(self.pool, course_id).await
    }

    async fn is_enrolled(&self, student_id: &str, course_id: &str) -> Result<bool, sqlx::Error> {
        repositories::enrollments::exists(self.pool, student_id, course_id).await
    }

    async fn completed_scores_for_student(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Vec<ScoredAttempt>, sqlx::Error> {
        repositories::attempts::scored_for_student_course(self.pool, student_id, course_id).await
    }

    async fn finalize_attempt(
        &self,
        attempt_id: &str,
        end_time: PrimitiveDateTime,
        score: Option<f64>,
        completed: bool,
    ) -> Result<(), sqlx::Error> {
        repositories::attempts::finalize(self.pool, attempt_id, end_time, score, completed).await
    }

    async fn discard_attempt(&self, attempt_id: &str) -> Result<(), sqlx::Error> {
        repositories::attempts::delete(self.pool, attempt_id).await.map(|_| ())
    }

    async fn all_enrollments(&self) -> Result<Vec<EnrollmentPair>, sqlx::Error> {
        repositories::enrollments::all_pairs(self.pool).await
    }

    async fn all_exam_weights(&self) -> Result<Vec<ExamWeight>, sqlx::Error> {
        repositories::exams::all_weights(self.pool).await
    }

    async fn all_scored_attempts(&self) -> Result<Vec<ScoredAttempt>, sqlx::Error> {
        repositories::attempts::all_scored(self.pool).await
    }
}
