//! Subscriber resource
//!
//! Single-row writes normalize the number the same way the list upload does.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use dialcast_core::models::{Subscriber, SubscriberRequest};
use dialcast_core::validation::REQUIRED;
use dialcast_core::{normalize_phone_number, AppError, ValidationErrors};
use std::sync::Arc;
use uuid::Uuid;

fn not_found() -> AppError {
    AppError::NotFound("Subscriber not found".to_string())
}

fn checked_phone_number(request: &SubscriberRequest) -> Result<String, ValidationErrors> {
    let raw = request.phone_number.trim();
    let mut errors = ValidationErrors::new();
    errors.check(!raw.is_empty(), "phone_number", REQUIRED);
    errors.into_result()?;
    Ok(normalize_phone_number(raw))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscribers",
    tag = "subscribers",
    responses((status = 200, description = "Subscribers in dialing order", body = Vec<Subscriber>)),
    security(("bearer" = []))
)]
pub async fn list_subscribers(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let subscribers = state.db.subscribers.list_subscribers(user.user_id).await?;
    Ok(Json(subscribers))
}

#[utoipa::path(
    post,
    path = "/api/v1/subscribers",
    tag = "subscribers",
    request_body = SubscriberRequest,
    responses(
        (status = 201, description = "Subscriber created", body = Subscriber),
        (status = 422, description = "Missing phone number", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_subscriber(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<SubscriberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let phone_number = checked_phone_number(&request)?;
    let subscriber = state
        .db
        .subscribers
        .create_subscriber(user.user_id, &phone_number)
        .await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscribers/{id}",
    tag = "subscribers",
    params(("id" = Uuid, Path, description = "Subscriber id")),
    responses(
        (status = 200, description = "Subscriber", body = Subscriber),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_subscriber(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let subscriber = state
        .db
        .subscribers
        .get_subscriber(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(subscriber))
}

#[utoipa::path(
    put,
    path = "/api/v1/subscribers/{id}",
    tag = "subscribers",
    params(("id" = Uuid, Path, description = "Subscriber id")),
    request_body = SubscriberRequest,
    responses(
        (status = 200, description = "Subscriber updated", body = Subscriber),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_subscriber(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SubscriberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let phone_number = checked_phone_number(&request)?;
    let subscriber = state
        .db
        .subscribers
        .update_subscriber(user.user_id, id, &phone_number)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(subscriber))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subscribers/{id}",
    tag = "subscribers",
    params(("id" = Uuid, Path, description = "Subscriber id")),
    responses(
        (status = 204, description = "Subscriber deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_subscriber(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.subscribers.delete_subscriber(user.user_id, id).await? {
        return Err(not_found().into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_is_normalized() {
        let request = SubscriberRequest {
            phone_number: " 15551234567 ".to_string(),
        };
        assert_eq!(checked_phone_number(&request).unwrap(), "+15551234567");
    }

    #[test]
    fn test_blank_phone_number_rejected() {
        let request = SubscriberRequest {
            phone_number: "  ".to_string(),
        };
        let errors = checked_phone_number(&request).unwrap_err();
        assert!(errors.has_field("phone_number"));
    }
}
