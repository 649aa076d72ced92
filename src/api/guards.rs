use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Course, DepartmentHead, Instructor, Student, User};
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

pub(crate) struct CurrentStudent {
    pub(crate) user: User,
    pub(crate) student: Student,
}

pub(crate) struct CurrentInstructor {
    pub(crate) user: User,
    pub(crate) instructor: Instructor,
}

pub(crate) struct CurrentDepartmentHead {
    pub(crate) user: User,
    pub(crate) head: DepartmentHead,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        // A role change invalidates tokens issued before it.
        if user.role != claims.role {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

async fn user_with_role(
    parts: &mut Parts,
    state: &AppState,
    role: UserRole,
) -> Result<User, ApiError> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

    if user.role == role {
        Ok(user)
    } else {
        Err(ApiError::Forbidden("Not enough permissions"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        user_with_role(parts, state, UserRole::Admin).await.map(CurrentAdmin)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = user_with_role(parts, state, UserRole::Student).await?;
        let student = repositories::students::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student profile"))?
            .ok_or(ApiError::Forbidden("Student profile not found"))?;

        Ok(CurrentStudent { user, student })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentInstructor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = user_with_role(parts, state, UserRole::Instructor).await?;
        let instructor = repositories::instructors::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load instructor profile"))?
            .ok_or(ApiError::Forbidden("Instructor profile not found"))?;

        Ok(CurrentInstructor { user, instructor })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentDepartmentHead {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = user_with_role(parts, state, UserRole::DepartmentHead).await?;
        let head = repositories::department_heads::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load department head profile"))?
            .ok_or(ApiError::Forbidden("Department head profile not found"))?;

        Ok(CurrentDepartmentHead { user, head })
    }
}

/// Loads the course and checks the instructor teaches it.
pub(crate) async fn require_course_owner(
    state: &AppState,
    instructor: &Instructor,
    course_id: &str,
) -> Result<Course, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    if course.instructor_id != instructor.id {
        return Err(ApiError::Forbidden("You do not teach this course"));
    }

    Ok(course)
}

pub(crate) async fn require_enrollment(
    state: &AppState,
    student: &Student,
    course_id: &str,
) -> Result<(), ApiError> {
    let enrolled = repositories::enrollments::exists(state.db(), &student.id, course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?;

    if enrolled {
        Ok(())
    } else {
        Err(ApiError::Forbidden("You are not enrolled in this course"))
    }
}
