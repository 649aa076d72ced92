use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::repositories::courses::{CourseCounts, CourseOverview};
use crate::repositories::enrollments::EnrollmentDetail;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: String,
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub(crate) name: String,
    #[validate(length(min = 1, message = "instructor_id is required"))]
    pub(crate) instructor_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) instructor_id: String,
    pub(crate) instructor_name: String,
}

impl From<CourseOverview> for CourseResponse {
    fn from(course: CourseOverview) -> Self {
        Self {
            id: course.id,
            code: course.code,
            name: course.name,
            instructor_id: course.instructor_id,
            instructor_name: course.instructor_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EnrollmentCreate {
    #[validate(length(min = 1, message = "student_id is required"))]
    pub(crate) student_id: String,
    #[validate(length(min = 1, message = "course_id is required"))]
    pub(crate) course_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) student_number: String,
    pub(crate) student_name: String,
    pub(crate) course_code: String,
    pub(crate) course_name: String,
    pub(crate) enrolled_at: String,
}

impl From<EnrollmentDetail> for EnrollmentResponse {
    fn from(detail: EnrollmentDetail) -> Self {
        Self {
            id: detail.id,
            student_id: detail.student_id,
            course_id: detail.course_id,
            student_number: detail.student_number,
            student_name: detail.student_name,
            course_code: detail.course_code,
            course_name: detail.course_name,
            enrolled_at: format_primitive(detail.enrolled_at),
        }
    }
}

/// Course as listed for its instructor.
#[derive(Debug, Serialize)]
pub(crate) struct InstructorCourseResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) exam_count: i64,
    pub(crate) student_count: i64,
}

impl From<CourseCounts> for InstructorCourseResponse {
    fn from(course: CourseCounts) -> Self {
        Self {
            id: course.id,
            code: course.code,
            name: course.name,
            exam_count: course.exam_count,
            student_count: course.student_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseStudentResponse {
    pub(crate) id: String,
    pub(crate) student_number: String,
    pub(crate) full_name: String,
    pub(crate) course_grade: Option<f64>,
}

/// Enrolled course as listed for a student.
#[derive(Debug, Serialize)]
pub(crate) struct StudentCourseResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) instructor_name: String,
    pub(crate) course_grade: Option<f64>,
}
