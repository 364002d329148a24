//! Account handlers: registration, login, logout and account removal.

use crate::auth::token::{extract_token_prefix, generate_access_token, hash_access_token};
use crate::auth::AuthUser;
use crate::constants::TOKEN_TYPE;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::MessageResponse;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{Duration, Utc};
use dialcast_core::encryption::{hash_secret, verify_secret};
use dialcast_core::models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use dialcast_core::validation::validate_registration;
use dialcast_core::AppError;
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

#[utoipa::path(
    post,
    path = "/register",
    tag = "accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 409, description = "Username taken", body = ErrorResponse),
        (status = 422, description = "Invalid registration form", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_registration(
        &request.username,
        &request.email,
        &request.password1,
        &request.password2,
    )?;

    let password_hash = hash_secret(&request.password1)?;
    let user = state
        .db
        .users
        .create_user(request.username.trim(), request.email.trim(), &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/accounts/login",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .db
        .users
        .find_by_username(request.username.trim())
        .await?
        .filter(|user| verify_secret(&request.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let token = generate_access_token();
    let token_hash = hash_access_token(&token)?;
    let expires_at = Utc::now() + Duration::hours(state.config.token_ttl_hours());

    state
        .db
        .tokens
        .create_token(
            user.id,
            &token_hash,
            &extract_token_prefix(&token),
            expires_at,
        )
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: TOKEN_TYPE.to_string(),
        expires_at,
    }))
}

#[utoipa::path(
    post,
    path = "/accounts/logout",
    tag = "accounts",
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    state.db.tokens.revoke_token(user.token_id).await?;
    Ok(Json(MessageResponse::new("Successfully logged out.")))
}

#[utoipa::path(
    get,
    path = "/accounts/me",
    tag = "accounts",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let account = state
        .db
        .users
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(account)))
}

/// Delete the caller's account with everything it owns, then drop the stored audio.
#[utoipa::path(
    delete,
    path = "/accounts/me",
    tag = "accounts",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let storage_keys = state
        .db
        .users
        .delete_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    for key in &storage_keys {
        if let Err(e) = state.media.storage.delete(key).await {
            tracing::warn!(error = %e, storage_key = %key, "Failed to delete stored audio");
        }
    }

    tracing::info!(audio_files = storage_keys.len(), "Account deleted");

    Ok(StatusCode::NO_CONTENT)
}
