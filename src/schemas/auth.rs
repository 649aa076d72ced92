use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{DepartmentHead, Instructor, Student, User};
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserProfile,
}

/// The signed-in user with the ids of its role row.
#[derive(Debug, Serialize)]
pub(crate) struct UserProfile {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) role: UserRole,
    pub(crate) full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) instructor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) department_head_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) department: Option<String>,
}

pub(crate) enum RoleProfile {
    Student(Student),
    Instructor(Instructor),
    DepartmentHead(DepartmentHead),
    None,
}

impl UserProfile {
    pub(crate) fn new(user: User, role_profile: RoleProfile) -> Self {
        let mut profile = Self {
            id: user.id,
            username: user.username,
            role: user.role,
            full_name: user.full_name,
            student_id: None,
            student_number: None,
            instructor_id: None,
            department_head_id: None,
            department: None,
        };

        match role_profile {
            RoleProfile::Student(student) => {
                profile.student_id = Some(student.id);
                profile.student_number = Some(student.student_number);
            }
            RoleProfile::Instructor(instructor) => {
                profile.instructor_id = Some(instructor.id);
                profile.department = Some(instructor.department);
            }
            RoleProfile::DepartmentHead(head) => {
                profile.department_head_id = Some(head.id);
                profile.department = Some(head.department);
            }
            RoleProfile::None => {}
        }

        profile
    }
}
