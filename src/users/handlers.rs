// HTTP handlers for user account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{middleware::AuthenticatedUser, models::Role};
use crate::error::ApiError;
use crate::users::models::{
    CreateUserRequest, NewUser, ProfileUpdate, UpdateUserRequest, UserResponse,
};
use crate::AppState;

const USER_NOT_FOUND: &str = "User not found";
const USER_ALREADY_DELETED: &str = "User has already been deleted";

fn not_found(message: &str) -> ApiError {
    ApiError::NotFound {
        message: message.to_string(),
    }
}

async fn register(
    state: &AppState,
    request: CreateUserRequest,
    role: Role,
) -> Result<UserResponse, ApiError> {
    request.validate()?;

    let password_hash = state.hasher.hash_blocking(request.password).await?;
    let user = state
        .store
        .insert(NewUser {
            username: request.username,
            password_hash: password_hash.into_string(),
            role,
            given_name: request.given_name,
            address: request.address,
            zip_code: request.zip_code,
        })
        .await?;

    tracing::info!("Registered user: username={}, role={}", user.username, user.role);
    Ok(user.into())
}

/// Handler for POST /v1/user
/// Registers a customer; open to anonymous callers
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = register(&state, request, Role::Customer).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for POST /v1/user/admin
/// Registers an administrator; behind the Admin gate
pub async fn create_admin_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = register(&state, request, Role::Admin).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for GET /v1/user/me
pub async fn me_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .find_by_username(&caller.username)
        .await?
        .ok_or_else(|| not_found(USER_NOT_FOUND))?;

    Ok(Json(user.into()))
}

/// Handler for PUT /v1/user
/// Replaces the caller's profile and password
pub async fn update_me_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    // A missing account outranks a bad body
    if state.store.find_by_username(&caller.username).await?.is_none() {
        return Err(not_found(USER_NOT_FOUND));
    }
    request.validate()?;

    let password_hash = state.hasher.hash_blocking(request.password).await?;
    state
        .store
        .update_profile(
            &caller.username,
            ProfileUpdate {
                password_hash: password_hash.into_string(),
                given_name: request.given_name,
                address: request.address,
                zip_code: request.zip_code,
            },
        )
        .await?
        .ok_or_else(|| not_found(USER_NOT_FOUND))?;

    tracing::info!("Updated user: username={}", caller.username);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /v1/user/me
pub async fn delete_me_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .delete(&caller.username)
        .await?
        .ok_or_else(|| not_found(USER_ALREADY_DELETED))?;

    tracing::info!("Deleted own account: username={}", user.username);
    Ok(Json(user.into()))
}

/// Handler for GET /v1/user/:username
/// Admin only
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .find_by_username(&username)
        .await?
        .ok_or_else(|| not_found(USER_NOT_FOUND))?;

    Ok(Json(user.into()))
}

/// Handler for DELETE /v1/user/:username
/// Admin only
pub async fn delete_user_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .delete(&username)
        .await?
        .ok_or_else(|| not_found(USER_ALREADY_DELETED))?;

    tracing::info!("Deleted user: username={}, by={}", user.username, caller.username);
    Ok(Json(user.into()))
}
