//! Campaign settings resource (`user-settings`)
//!
//! A user has at most one settings row, so create and update both upsert it.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use dialcast_core::models::{CampaignSettings, SettingsRequest};
use dialcast_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

fn not_found() -> AppError {
    AppError::NotFound("Campaign settings not found".to_string())
}

#[utoipa::path(
    get,
    path = "/api/v1/user-settings",
    tag = "user-settings",
    responses((status = 200, description = "Zero or one settings row", body = Vec<CampaignSettings>)),
    security(("bearer" = []))
)]
pub async fn list_settings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let settings: Vec<CampaignSettings> = state
        .db
        .settings
        .get_for_user(user.user_id)
        .await?
        .into_iter()
        .collect();
    Ok(Json(settings))
}

#[utoipa::path(
    post,
    path = "/api/v1/user-settings",
    tag = "user-settings",
    request_body = SettingsRequest,
    responses(
        (status = 201, description = "Settings saved", body = CampaignSettings),
        (status = 404, description = "Provider or audio file not owned by the caller", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_settings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<SettingsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let settings = state
        .db
        .settings
        .upsert_for_user(user.user_id, request.provider_id, request.audio_file_id)
        .await?;
    Ok((StatusCode::CREATED, Json(settings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/user-settings/{id}",
    tag = "user-settings",
    params(("id" = Uuid, Path, description = "Settings id")),
    responses(
        (status = 200, description = "Settings", body = CampaignSettings),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let settings = state
        .db
        .settings
        .get_settings(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/v1/user-settings/{id}",
    tag = "user-settings",
    params(("id" = Uuid, Path, description = "Settings id")),
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = CampaignSettings),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SettingsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .db
        .settings
        .get_settings(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    let settings = state
        .db
        .settings
        .upsert_for_user(user.user_id, request.provider_id, request.audio_file_id)
        .await?;
    Ok(Json(settings))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user-settings/{id}",
    tag = "user-settings",
    params(("id" = Uuid, Path, description = "Settings id")),
    responses(
        (status = 204, description = "Settings deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_settings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.settings.delete_settings(user.user_id, id).await? {
        return Err(not_found().into());
    }
    Ok(StatusCode::NO_CONTENT)
}
