use crate::auth::models::AuthUser;
use crate::auth::token::{extract_token_prefix, looks_like_access_token, verify_access_token};
use crate::constants::{TOKEN_INVALID_MESSAGE, TOKEN_REQUIRED_MESSAGE};
use crate::error::{ErrorResponse, HttpAppError};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use dialcast_core::AppError;
use dialcast_db::AccessTokenRepository;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;

/// Counts failed bearer checks per client and locks a client out for the rest of the
/// window once it reaches `max_failures`.
#[derive(Clone)]
pub struct AuthFailureLimiter {
    inner: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_failures: u32,
    window: Duration,
}

impl AuthFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Returns true once the client has hit the limit.
    pub async fn record_failure(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        guard.retain(|_, (_, reset_at)| now < *reset_at);
        let (count, reset_at) = guard.entry(ip.to_string()).or_insert((0, now + self.window));
        if now >= *reset_at {
            *count = 0;
            *reset_at = now + self.window;
        }
        *count += 1;
        *count >= self.max_failures
    }

    pub async fn is_blocked(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        if let Some((count, reset_at)) = guard.get(ip) {
            if Instant::now() >= *reset_at {
                guard.remove(ip);
                return false;
            }
            return *count >= self.max_failures;
        }
        false
    }

    /// Clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub tokens: AccessTokenRepository,
    pub trusted_proxies: Vec<IpAddr>,
    pub auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
}

/// Client address used to key the lockout.
///
/// Forwarding headers are only read when the peer is a trusted proxy; otherwise any
/// client could pick its own key. Without a socket address every request shares the
/// `unknown` key.
fn client_ip(
    headers: &HeaderMap,
    socket_addr: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = socket_addr.map(|addr| addr.ip()) else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .and_then(|ip| ip.parse::<IpAddr>().ok());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    forwarded.or_else(real_ip).unwrap_or(peer).to_string()
}

/// Token from `Authorization: Bearer <token>` (or the `Token <token>` form).
/// `Some("")` means a header was sent but carried no usable token.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?;
    let value = value.to_str().unwrap_or_default().trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .unwrap_or_default()
        .trim();
    Some(token)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::message(message)),
    )
        .into_response()
}

fn too_many_attempts() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, "Too many failed auth attempts").into_response()
}

/// Reject with `message`, counting the failure against the client.
async fn reject(auth_state: &AuthState, ip: &str, message: &str) -> Response {
    if let Some(ref limiter) = auth_state.auth_failure_limiter {
        if limiter.record_failure(ip).await {
            tracing::warn!(client_ip = %ip, "Client locked out after repeated auth failures");
            return too_many_attempts();
        }
    }
    tracing::debug!(client_ip = %ip, reason = message, "Authentication failed");
    unauthorized(message)
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), socket_addr, &auth_state.trusted_proxies);

    if let Some(ref limiter) = auth_state.auth_failure_limiter {
        if limiter.is_blocked(&ip).await {
            return too_many_attempts();
        }
    }

    let token = match bearer_token(request.headers()) {
        None => return reject(&auth_state, &ip, TOKEN_REQUIRED_MESSAGE).await,
        Some(token) => token.to_string(),
    };

    if !looks_like_access_token(&token) {
        return reject(&auth_state, &ip, TOKEN_INVALID_MESSAGE).await;
    }

    match authenticate_token(&token, &auth_state.tokens).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = %user.user_id, "Authenticated request");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => reject(&auth_state, &ip, TOKEN_INVALID_MESSAGE).await,
        Err(e) => HttpAppError(e).into_response(),
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Match a token against the active tokens sharing its prefix.
async fn authenticate_token(
    token: &str,
    tokens: &AccessTokenRepository,
) -> Result<Option<AuthUser>, AppError> {
    let prefix = extract_token_prefix(token);
    let candidates = tokens.find_active_by_prefix(&prefix).await?;
    let now = Utc::now();

    Ok(candidates
        .into_iter()
        .filter(|candidate| candidate.is_usable_at(now))
        .filter(|candidate| secure_compare(&candidate.token_prefix, &prefix))
        .find(|candidate| verify_access_token(token, &candidate.token_hash))
        .map(|candidate| AuthUser {
            user_id: candidate.user_id,
            token_id: candidate.id,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("dc_0123456789abc", "dc_0123456789abc"));
        assert!(!secure_compare("dc_0123456789abc", "dc_0123456789abd"));
        assert!(!secure_compare("dc_0123", "dc_0123456789abc"));
    }

    #[tokio::test]
    async fn test_limiter_blocks_after_max_failures() {
        let limiter = AuthFailureLimiter::new(3, 900);
        assert!(!limiter.record_failure("10.0.0.1").await);
        assert!(!limiter.record_failure("10.0.0.1").await);
        assert!(!limiter.is_blocked("10.0.0.1").await);
        assert!(limiter.record_failure("10.0.0.1").await);
        assert!(limiter.is_blocked("10.0.0.1").await);
        assert!(!limiter.is_blocked("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_limiter_window_expires() {
        let limiter = AuthFailureLimiter::new(1, 0);
        assert!(limiter.record_failure("10.0.0.1").await);
        assert!(!limiter.is_blocked("10.0.0.1").await);
    }

    #[test]
    fn test_bearer_token_forms() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer dc_abc"));
        assert_eq!(bearer_token(&headers), Some("dc_abc"));

        headers.insert("Authorization", HeaderValue::from_static("Token dc_abc"));
        assert_eq!(bearer_token(&headers), Some("dc_abc"));

        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), Some(""));
    }

    #[tokio::test]
    async fn test_limiter_prunes_expired_clients() {
        let limiter = AuthFailureLimiter::new(5, 0);
        for i in 0..50 {
            limiter.record_failure(&format!("203.0.113.{}", i)).await;
        }
        assert!(limiter.tracked_clients().await <= 1);
    }

    #[test]
    fn test_client_ip_ignores_forwarding_headers_from_untrusted_peer() {
        let socket: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.1.1.1"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));

        assert_eq!(client_ip(&headers, Some(socket), &[]), "192.168.1.9");
        assert_eq!(client_ip(&headers, None, &[]), "unknown");
    }

    #[test]
    fn test_client_ip_reads_forwarding_headers_behind_trusted_proxy() {
        let proxy: SocketAddr = "10.0.0.2:41000".parse().unwrap();
        let trusted = ["10.0.0.2".parse::<IpAddr>().unwrap()];
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(proxy), &trusted), "10.0.0.2");

        headers.insert("x-real-ip", HeaderValue::from_static("10.1.1.1"));
        assert_eq!(client_ip(&headers, Some(proxy), &trusted), "10.1.1.1");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(proxy), &trusted), "203.0.113.7");

        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        assert_eq!(client_ip(&headers, Some(proxy), &trusted), "10.1.1.1");
    }
}
