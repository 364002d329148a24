//! Guided campaign workflow
//!
//! Provider, audio file, subscriber list, calls. Each step answers with a
//! user-facing message and the name of the step that follows it.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::audio_files::store_audio_upload;
use crate::handlers::providers::create_provider_record;
use crate::state::AppState;
use crate::utils::upload::read_upload_form;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json},
};
use dialcast_core::models::{
    AudioFileResponse, CampaignReport, CampaignSettings, IngestReport, ProviderRequest,
    ProviderResponse,
};
use dialcast_core::validation::{validate_subscriber_upload, REQUIRED};
use dialcast_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub const PROVIDER_SAVED: &str = "Telephony provider created successfully.";
pub const AUDIO_SAVED: &str = "Audio file uploaded successfully.";
pub const SUBSCRIBERS_SAVED: &str = "Subscriber list uploaded successfully.";
pub const CALLS_MADE: &str = "Calls made successfully.";
pub const CALLS_DONE: &str = "All calls have been processed.";

/// Workflow step names, as they appear in `next`.
pub mod steps {
    pub const SAVE_PROVIDER: &str = "save_provider";
    pub const SAVE_AUDIO_FILE: &str = "save_audio_file";
    pub const SAVE_SUBSCRIBER_LIST: &str = "save_subscriber_list";
    pub const MAKE_CALLS: &str = "make_calls";
    pub const MAKE_CALLS_DONE: &str = "make_calls_done";
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderSaved {
    pub message: String,
    pub next: String,
    pub provider: ProviderResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AudioFileSaved {
    pub message: String,
    pub next: String,
    pub audio_file: AudioFileResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriberListSaved {
    pub message: String,
    pub next: String,
    pub report: IngestReport,
    /// False while the user still lacks a provider or an audio file.
    pub settings_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<CampaignSettings>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallsMade {
    pub message: String,
    pub next: String,
    pub report: CampaignReport,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkflowStep {
    pub message: String,
    pub next: String,
}

#[utoipa::path(
    post,
    path = "/save_provider",
    tag = "workflow",
    request_body = ProviderRequest,
    responses(
        (status = 200, description = "Provider saved", body = ProviderSaved),
        (status = 422, description = "Invalid provider", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn save_provider(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<ProviderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let provider = create_provider_record(&state, user.user_id, &request).await?;

    Ok(Json(ProviderSaved {
        message: PROVIDER_SAVED.to_string(),
        next: steps::SAVE_AUDIO_FILE.to_string(),
        provider: ProviderResponse::from(provider),
    }))
}

#[utoipa::path(
    post,
    path = "/save_audio_file",
    tag = "workflow",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Audio file saved", body = AudioFileSaved),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Invalid upload", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.user_id))]
pub async fn save_audio_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    let audio = store_audio_upload(&state, user.user_id, form).await?;

    Ok(Json(AudioFileSaved {
        message: AUDIO_SAVED.to_string(),
        next: steps::SAVE_SUBSCRIBER_LIST.to_string(),
        audio_file: AudioFileResponse::from(audio),
    }))
}

#[utoipa::path(
    post,
    path = "/save_subscriber_list",
    tag = "workflow",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Subscriber list saved", body = SubscriberListSaved),
        (status = 400, description = "Missing phone_number column", body = ErrorResponse),
        (status = 422, description = "Invalid upload", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.user_id))]
pub async fn save_subscriber_list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    let clear = form.flag("clear_subscribers");

    let file = match form.file {
        Some(file) => file,
        None => {
            let mut errors = ValidationErrors::new();
            errors.push("file", REQUIRED);
            return Err(errors.into());
        }
    };
    validate_subscriber_upload(&file.filename, file.data.len())?;

    let summary = state
        .workflow
        .ingest
        .ingest_and_configure(user.user_id, &file.data, clear)
        .await?;

    Ok(Json(SubscriberListSaved {
        message: SUBSCRIBERS_SAVED.to_string(),
        next: steps::MAKE_CALLS.to_string(),
        report: summary.report,
        settings_configured: summary.settings.is_some(),
        settings: summary.settings,
    }))
}

/// Dial every subscriber in order. Blocks until the last call has hung up.
#[utoipa::path(
    post,
    path = "/make_calls",
    tag = "workflow",
    responses(
        (status = 200, description = "Campaign finished; per-call outcomes in the report", body = CallsMade),
        (status = 409, description = "Settings missing", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn make_calls(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let report = state.workflow.campaign.run(user.user_id).await?;

    Ok(Json(CallsMade {
        message: CALLS_MADE.to_string(),
        next: steps::MAKE_CALLS_DONE.to_string(),
        report,
    }))
}

#[utoipa::path(
    get,
    path = "/make_calls_done",
    tag = "workflow",
    responses((status = 200, description = "Workflow finished", body = WorkflowStep)),
    security(("bearer" = []))
)]
pub async fn make_calls_done(_user: AuthUser) -> Json<WorkflowStep> {
    Json(WorkflowStep {
        message: CALLS_DONE.to_string(),
        next: steps::SAVE_PROVIDER.to_string(),
    })
}
