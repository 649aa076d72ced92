use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::{validate_password_len, validate_username};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::course::{CourseCreate, CourseResponse, EnrollmentCreate, EnrollmentResponse};
use crate::schemas::user::{
    DepartmentHeadResponse, InstructorResponse, StaffCreate, StudentCreate, StudentResponse,
    UserResponse, UserUpdate, UsernameAvailability,
};
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/:id", delete(delete_student))
        .route("/students/:id/courses", get(student_courses))
        .route("/instructors", get(list_instructors).post(create_instructor))
        .route("/instructors/:id", delete(delete_instructor))
        .route("/department-heads", post(create_department_head))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/:id", delete(delete_course))
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route("/enrollments/:id", delete(delete_enrollment))
        .route("/users", get(list_users))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/users/check-username/:username", get(check_username))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| db.is_unique_violation())
}

async fn list_students(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = repositories::students::list_profiles(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

async fn create_student(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(payload): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_username(&payload.username)?;
    validate_password_len(&payload.password)?;

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    if repositories::users::exists_by_username(&mut *tx, &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check username"))?
    {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    if repositories::students::exists_by_number(&mut *tx, &payload.student_number)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check student number"))?
    {
        return Err(ApiError::Conflict("Student number already exists".to_string()));
    }

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username: &payload.username,
            hashed_password,
            full_name: &payload.full_name,
            role: UserRole::Student,
            created_at: now,
        },
    )
    .await
    .map_err(|e| conflict_or_internal(e, "Username already exists", "Failed to create user"))?;

    let student = repositories::students::create(
        &mut *tx,
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            student_number: &payload.student_number,
            created_at: now,
        },
    )
    .await
    .map_err(|e| {
        conflict_or_internal(e, "Student number already exists", "Failed to create student")
    })?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit student"))?;

    tracing::info!(student_id = %student.id, username = %user.username, "Created student");

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            id: student.id,
            user_id: user.id,
            username: user.username,
            full_name: user.full_name,
            student_number: student.student_number,
        }),
    ))
}

fn conflict_or_internal(err: sqlx::Error, conflict: &str, context: &str) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Conflict(conflict.to_string())
    } else {
        ApiError::internal(err, context)
    }
}

async fn delete_student(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(student_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::students::delete(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete student"))?;

    if !deleted {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

async fn student_courses(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    repositories::students::find_by_id(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    let course_ids = repositories::enrollments::course_ids_for_student(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;

    Ok(Json(course_ids))
}

async fn list_instructors(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> Result<Json<Vec<InstructorResponse>>, ApiError> {
    let instructors = repositories::instructors::list_profiles(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list instructors"))?;

    Ok(Json(instructors.into_iter().map(InstructorResponse::from).collect()))
}

/// Creates the user row for a staff member inside `tx`.
async fn create_staff_user(
    tx: &mut sqlx::PgConnection,
    payload: &StaffCreate,
    role: UserRole,
) -> Result<User, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_username(&payload.username)?;
    validate_password_len(&payload.password)?;

    if repositories::users::exists_by_username(&mut *tx, &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check username"))?
    {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username: &payload.username,
            hashed_password,
            full_name: &payload.full_name,
            role,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| conflict_or_internal(e, "Username already exists", "Failed to create user"))
}

async fn create_instructor(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(payload): Json<StaffCreate>,
) -> Result<(StatusCode, Json<InstructorResponse>), ApiError> {
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    let user = create_staff_user(&mut tx, &payload, UserRole::Instructor).await?;
    let instructor = repositories::instructors::create(
        &mut *tx,
        repositories::instructors::CreateInstructor {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            department: &payload.department,
            created_at: user.created_at,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create instructor"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit instructor"))?;

    tracing::info!(instructor_id = %instructor.id, username = %user.username, "Created instructor");

    Ok((
        StatusCode::CREATED,
        Json(InstructorResponse {
            id: instructor.id,
            user_id: user.id,
            username: user.username,
            full_name: user.full_name,
            department: instructor.department,
        }),
    ))
}

async fn delete_instructor(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(instructor_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::instructors::delete(state.db(), &instructor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete instructor"))?;

    if !deleted {
        return Err(ApiError::NotFound("Instructor not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Instructor deleted successfully")))
}

async fn create_department_head(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(payload): Json<StaffCreate>,
) -> Result<(StatusCode, Json<DepartmentHeadResponse>), ApiError> {
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    let user = create_staff_user(&mut tx, &payload, UserRole::DepartmentHead).await?;
    let head = repositories::department_heads::create(
        &mut *tx,
        repositories::department_heads::CreateDepartmentHead {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            department: &payload.department,
            created_at: user.created_at,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create department head"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit department head"))?;

    Ok((
        StatusCode::CREATED,
        Json(DepartmentHeadResponse {
            id: head.id,
            user_id: user.id,
            username: user.username,
            full_name: user.full_name,
            department: head.department,
        }),
    ))
}

async fn list_courses(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list_overviews(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

async fn create_course(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::instructors::find_by_id(state.db(), &payload.instructor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch instructor"))?
        .ok_or_else(|| ApiError::NotFound("Instructor not found".to_string()))?;

    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            code: payload.code.trim(),
            name: payload.name.trim(),
            instructor_id: &payload.instructor_id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?
    .ok_or_else(|| ApiError::Conflict("Course code already exists".to_string()))?;

    let overview = repositories::courses::find_overview(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::internal("course vanished after insert", "Failed to fetch course"))?;

    tracing::info!(course_id = %course.id, code = %course.code, "Created course");

    Ok((StatusCode::CREATED, Json(CourseResponse::from(overview))))
}

async fn delete_course(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(course_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::courses::delete(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;

    if !deleted {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

async fn list_enrollments(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let enrollments = repositories::enrollments::list_details(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from).collect()))
}

async fn create_enrollment(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(payload): Json<EnrollmentCreate>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::students::find_by_id(state.db(), &payload.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    repositories::courses::find_by_id(state.db(), &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let enrollment_id = Uuid::new_v4().to_string();
    let created = repositories::enrollments::create(
        state.db(),
        repositories::enrollments::CreateEnrollment {
            id: &enrollment_id,
            student_id: &payload.student_id,
            course_id: &payload.course_id,
            enrolled_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create enrollment"))?;

    if !created {
        return Err(ApiError::Conflict("Student is already enrolled in this course".to_string()));
    }

    let detail = repositories::enrollments::find_detail(state.db(), &enrollment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch enrollment"))?
        .ok_or_else(|| {
            ApiError::internal("enrollment vanished after insert", "Failed to fetch enrollment")
        })?;

    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from(detail))))
}

async fn delete_enrollment(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(enrollment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::enrollments::delete(state.db(), &enrollment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete enrollment"))?;

    if !deleted {
        return Err(ApiError::NotFound("Enrollment not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Enrollment deleted successfully")))
}

async fn list_users(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = repositories::users::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

async fn update_user(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(user_id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut update = repositories::users::UpdateUser {
        full_name: payload.full_name,
        role: payload.role,
        ..Default::default()
    };

    if let Some(username) = payload.username {
        validate_username(&username)?;
        let taken = repositories::users::find_by_username(state.db(), &username)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check username"))?
            .is_some_and(|existing| existing.id != user_id);
        if taken {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        update.username = Some(username);
    }

    if let Some(password) = payload.password.filter(|password| !password.is_empty()) {
        validate_password_len(&password)?;
        update.hashed_password = Some(
            security::hash_password(&password)
                .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
        );
    }

    let user = repositories::users::update(state.db(), &user_id, update, primitive_now_utc())
        .await
        .map_err(|e| conflict_or_internal(e, "Username already exists", "Failed to update user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(user)))
}

async fn delete_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if admin.id == user_id {
        return Err(ApiError::BadRequest("You cannot delete your own account".to_string()));
    }

    let deleted = repositories::users::delete(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, deleted_by = %admin.id, "Deleted user");

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

async fn check_username(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(username): Path<String>,
) -> Result<Json<UsernameAvailability>, ApiError> {
    let exists = repositories::users::exists_by_username(state.db(), &username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check username"))?;

    Ok(Json(UsernameAvailability { username, available: !exists }))
}

#[cfg(test)]
mod tests;
