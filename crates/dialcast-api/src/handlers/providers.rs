//! Telephony provider resource
//!
//! The SIP secret is sealed before it reaches the repository and never appears in a
//! response.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use dialcast_core::models::{
    ProviderRequest, ProviderResponse, TelephonyProvider, UpdateProviderRequest,
};
use dialcast_core::validation::{validate_provider, REQUIRED};
use dialcast_core::{AppError, ValidationErrors};
use std::sync::Arc;
use uuid::Uuid;

fn not_found() -> AppError {
    AppError::NotFound("Telephony provider not found".to_string())
}

/// Validate, seal and insert a provider. Shared with the workflow endpoint.
pub async fn create_provider_record(
    state: &AppState,
    user_id: Uuid,
    request: &ProviderRequest,
) -> Result<TelephonyProvider, HttpAppError> {
    validate_provider(
        &request.sip_gateway_address,
        &request.username,
        &request.password,
    )?;

    let sealed = state.sealer.seal(&request.password)?;
    let provider = state
        .db
        .providers
        .create_provider(
            user_id,
            request.sip_gateway_address.trim(),
            request.username.trim(),
            &sealed,
        )
        .await?;

    tracing::info!(
        provider_id = %provider.id,
        gateway = %provider.sip_gateway_address,
        "Telephony provider created"
    );

    Ok(provider)
}

#[utoipa::path(
    get,
    path = "/api/v1/telephony-providers",
    tag = "telephony-providers",
    responses((status = 200, description = "Providers of the caller", body = Vec<ProviderResponse>)),
    security(("bearer" = []))
)]
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let providers = state.db.providers.list_providers(user.user_id).await?;
    let response: Vec<ProviderResponse> =
        providers.into_iter().map(ProviderResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/telephony-providers",
    tag = "telephony-providers",
    request_body = ProviderRequest,
    responses(
        (status = 201, description = "Provider created", body = ProviderResponse),
        (status = 422, description = "Invalid provider", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_provider(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<ProviderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let provider = create_provider_record(&state, user.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(ProviderResponse::from(provider))))
}

#[utoipa::path(
    get,
    path = "/api/v1/telephony-providers/{id}",
    tag = "telephony-providers",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Provider", body = ProviderResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let provider = state
        .db
        .providers
        .get_provider(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(ProviderResponse::from(provider)))
}

#[utoipa::path(
    put,
    path = "/api/v1/telephony-providers/{id}",
    tag = "telephony-providers",
    params(("id" = Uuid, Path, description = "Provider id")),
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ProviderResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 422, description = "Invalid provider", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_provider(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateProviderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut errors = ValidationErrors::new();
    if let Some(address) = request.sip_gateway_address.as_deref() {
        errors.check(!address.trim().is_empty(), "sip_gateway_address", REQUIRED);
        errors.check(
            !address.trim().chars().any(char::is_whitespace),
            "sip_gateway_address",
            "Gateway address must not contain whitespace.",
        );
    }
    if let Some(username) = request.username.as_deref() {
        errors.check(!username.trim().is_empty(), "username", REQUIRED);
    }
    if let Some(password) = request.password.as_deref() {
        errors.check(!password.trim().is_empty(), "password", REQUIRED);
    }
    errors.into_result()?;

    let sealed = request
        .password
        .as_deref()
        .map(|password| state.sealer.seal(password))
        .transpose()?;

    let provider = state
        .db
        .providers
        .update_provider(
            user.user_id,
            id,
            request.sip_gateway_address.as_deref().map(str::trim),
            request.username.as_deref().map(str::trim),
            sealed.as_ref(),
        )
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ProviderResponse::from(provider)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/telephony-providers/{id}",
    tag = "telephony-providers",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses(
        (status = 204, description = "Provider and dependent settings deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_provider(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.providers.delete_provider(user.user_id, id).await? {
        return Err(not_found().into());
    }
    Ok(StatusCode::NO_CONTENT)
}
