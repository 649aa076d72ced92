use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::instructors::InstructorProfile;
use crate::repositories::students::StudentProfile;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentCreate {
    pub(crate) username: String,
    pub(crate) password: String,
    #[validate(length(min = 1, message = "full_name is required"))]
    pub(crate) full_name: String,
    #[validate(length(min = 1, max = 20, message = "student_number must be 1-20 characters"))]
    pub(crate) student_number: String,
}

/// Body for creating instructors and department heads.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StaffCreate {
    pub(crate) username: String,
    pub(crate) password: String,
    #[validate(length(min = 1, message = "full_name is required"))]
    pub(crate) full_name: String,
    #[validate(length(min = 1, max = 100, message = "department must be 1-100 characters"))]
    pub(crate) department: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserUpdate {
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub(crate) full_name: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) student_number: String,
}

impl From<StudentProfile> for StudentResponse {
    fn from(profile: StudentProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            username: profile.username,
            full_name: profile.full_name,
            student_number: profile.student_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InstructorResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) department: String,
}

impl From<InstructorProfile> for InstructorResponse {
    fn from(profile: InstructorProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            username: profile.username,
            full_name: profile.full_name,
            department: profile.department,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DepartmentHeadResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) department: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UsernameAvailability {
    pub(crate) username: String,
    pub(crate) available: bool,
}
