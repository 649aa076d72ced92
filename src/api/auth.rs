use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{LoginRequest, RoleProfile, TokenResponse, UserProfile};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/login", post(login)).route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = repositories::users::find_by_username(state.db(), payload.username.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Invalid username or password"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Invalid username or password"));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let token = security::create_access_token(&user.id, user.role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: load_profile(&state, user).await?,
    }))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(load_profile(&state, user).await?))
}

async fn load_profile(state: &AppState, user: User) -> Result<UserProfile, ApiError> {
    let role_profile = match user.role {
        UserRole::Student => repositories::students::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student profile"))?
            .map_or(RoleProfile::None, RoleProfile::Student),
        UserRole::Instructor => repositories::instructors::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load instructor profile"))?
            .map_or(RoleProfile::None, RoleProfile::Instructor),
        UserRole::DepartmentHead => {
            repositories::department_heads::find_by_user_id(state.db(), &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load department head profile"))?
                .map_or(RoleProfile::None, RoleProfile::DepartmentHead)
        }
        UserRole::Admin => RoleProfile::None,
    };

    Ok(UserProfile::new(user, role_profile))
}
