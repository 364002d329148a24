//! Audio file resource
//!
//! Uploads are multipart (`name`, `file`). Every upload is decoded once before it is
//! stored, so anything in the store is known to play.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, UploadForm};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use dialcast_core::models::{AudioFile, AudioFileResponse, NewAudioFile, UpdateAudioFileRequest};
use dialcast_core::validation::REQUIRED;
use dialcast_core::{AppError, ValidationErrors};
use std::sync::Arc;
use uuid::Uuid;

const STORED_CONTENT_TYPE: &str = "audio/mpeg";

fn not_found() -> AppError {
    AppError::NotFound("Audio file not found".to_string())
}

/// Validate, store and record an uploaded MP3. Shared with the workflow endpoint.
pub async fn store_audio_upload(
    state: &AppState,
    user_id: Uuid,
    form: UploadForm,
) -> Result<AudioFile, HttpAppError> {
    let name = form.text("name").trim().to_string();

    let file = match form.file {
        Some(file) => file,
        None => {
            let mut errors = ValidationErrors::new();
            errors.check(!name.is_empty(), "name", REQUIRED);
            errors.push("file", REQUIRED);
            return Err(errors.into());
        }
    };

    if file.data.len() > state.media.validator.max_file_size() {
        return Err(AppError::PayloadTooLarge(format!(
            "File size {} bytes exceeds maximum allowed size of {} bytes.",
            file.data.len(),
            state.media.validator.max_file_size()
        ))
        .into());
    }

    // Decoding is CPU bound.
    let validator = state.media.validator.clone();
    let (validated, file) = tokio::task::spawn_blocking({
        let name = name.clone();
        move || {
            let result = validator.validate_upload(
                &name,
                &file.filename,
                file.content_type.as_deref(),
                &file.data,
            );
            (result, file)
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("Audio validation task failed: {}", e)))?;
    let pcm = validated?;

    let file_size = file.data.len() as i64;
    let stored_name = format!("{}.mp3", Uuid::new_v4());
    let storage_key = state
        .media
        .storage
        .upload(user_id, &stored_name, STORED_CONTENT_TYPE, file.data)
        .await?;

    let created = state
        .db
        .audio_files
        .create_audio_file(NewAudioFile {
            user_id,
            name,
            original_filename: file.filename,
            storage_key: storage_key.clone(),
            content_type: STORED_CONTENT_TYPE.to_string(),
            file_size,
            duration_ms: Some(pcm.duration_ms() as i64),
        })
        .await;

    match created {
        Ok(audio) => {
            tracing::info!(
                audio_file_id = %audio.id,
                file_size = audio.file_size,
                duration_ms = ?audio.duration_ms,
                "Audio file stored"
            );
            Ok(audio)
        }
        Err(e) => {
            if let Err(cleanup) = state.media.storage.delete(&storage_key).await {
                tracing::warn!(error = %cleanup, storage_key = %storage_key, "Failed to remove orphaned audio");
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/audio-files",
    tag = "audio-files",
    responses((status = 200, description = "Audio files of the caller", body = Vec<AudioFileResponse>)),
    security(("bearer" = []))
)]
pub async fn list_audio_files(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let files = state.db.audio_files.list_audio_files(user.user_id).await?;
    let response: Vec<AudioFileResponse> =
        files.into_iter().map(AudioFileResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/audio-files",
    tag = "audio-files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Audio file uploaded", body = AudioFileResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Invalid upload", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.user_id))]
pub async fn create_audio_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    let audio = store_audio_upload(&state, user.user_id, form).await?;
    Ok((StatusCode::CREATED, Json(AudioFileResponse::from(audio))))
}

#[utoipa::path(
    get,
    path = "/api/v1/audio-files/{id}",
    tag = "audio-files",
    params(("id" = Uuid, Path, description = "Audio file id")),
    responses(
        (status = 200, description = "Audio file", body = AudioFileResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_audio_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let audio = state
        .db
        .audio_files
        .get_audio_file(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(AudioFileResponse::from(audio)))
}

/// Rename an audio file. The audio itself is immutable; upload a new file instead.
#[utoipa::path(
    put,
    path = "/api/v1/audio-files/{id}",
    tag = "audio-files",
    params(("id" = Uuid, Path, description = "Audio file id")),
    request_body = UpdateAudioFileRequest,
    responses(
        (status = 200, description = "Audio file renamed", body = AudioFileResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 422, description = "Invalid name", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_audio_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateAudioFileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let audio = match request.name.as_deref().map(str::trim) {
        None => state.db.audio_files.get_audio_file(user.user_id, id).await?,
        Some(name) => {
            let mut errors = ValidationErrors::new();
            errors.check(!name.is_empty(), "name", REQUIRED);
            errors.into_result()?;
            state
                .db
                .audio_files
                .rename_audio_file(user.user_id, id, name)
                .await?
        }
    }
    .ok_or_else(not_found)?;

    Ok(Json(AudioFileResponse::from(audio)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/audio-files/{id}",
    tag = "audio-files",
    params(("id" = Uuid, Path, description = "Audio file id")),
    responses(
        (status = 204, description = "Audio file and dependent settings deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_audio_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let audio = state
        .db
        .audio_files
        .delete_audio_file(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    if let Err(e) = state.media.storage.delete(&audio.storage_key).await {
        tracing::warn!(error = %e, storage_key = %audio.storage_key, "Failed to delete stored audio");
    }

    Ok(StatusCode::NO_CONTENT)
}
