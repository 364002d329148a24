use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dialcast_core::AppError;
use uuid::Uuid;

/// The authenticated caller, inserted by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    /// Token the request was authenticated with; logout revokes it.
    pub token_id: Uuid,
}

// Extracted from request parts so it can sit next to Multipart in a handler signature.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    crate::constants::TOKEN_REQUIRED_MESSAGE.to_string(),
                ))
            })
    }
}
