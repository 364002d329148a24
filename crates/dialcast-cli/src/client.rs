//! HTTP client for the Dialcast API.
//!
//! Register and login work without a token; every other call sends
//! `Authorization: Bearer {token}`.

use anyhow::{Context, Result};
use dialcast_core::models::{LoginResponse, UserResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

use crate::describe_api_error;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// A campaign run holds the request open until the last call has ended.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Create client from environment: DIALCAST_API_URL and, when set, DIALCAST_TOKEN.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("DIALCAST_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token = std::env::var("DIALCAST_TOKEN").ok();
        Self::new(&base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .context("Missing token. Run `dialcast login` and set DIALCAST_TOKEN")?;
        Ok(request.header("Authorization", format!("Bearer {}", token)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(describe_api_error(status.as_u16(), &body)));
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse> {
        let body = json!({
            "username": username,
            "email": email,
            "password1": password,
            "password2": password,
        });
        self.send(self.client.post(self.build_url("/register")).json(&body))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = json!({ "username": username, "password": password });
        self.send(self.client.post(self.build_url("/accounts/login")).json(&body))
            .await
    }

    pub async fn save_provider(
        &self,
        sip_gateway_address: &str,
        username: &str,
        password: &str,
    ) -> Result<Value> {
        let body = json!({
            "sip_gateway_address": sip_gateway_address,
            "username": username,
            "password": password,
        });
        let request = self.client.post(self.build_url("/save_provider")).json(&body);
        self.send(self.authorized(request)?).await
    }

    pub async fn save_audio_file(&self, name: &str, path: &Path) -> Result<Value> {
        let form = Form::new()
            .text("name", name.to_string())
            .part("file", file_part(path).await?);
        let request = self
            .client
            .post(self.build_url("/save_audio_file"))
            .multipart(form);
        self.send(self.authorized(request)?).await
    }

    pub async fn save_subscriber_list(&self, path: &Path, clear: bool) -> Result<Value> {
        let mut form = Form::new().part("file", file_part(path).await?);
        if clear {
            form = form.text("clear_subscribers", "true");
        }
        let request = self
            .client
            .post(self.build_url("/save_subscriber_list"))
            .multipart(form);
        self.send(self.authorized(request)?).await
    }

    pub async fn make_calls(&self) -> Result<Value> {
        let request = self.client.post(self.build_url("/make_calls"));
        self.send(self.authorized(request)?).await
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(Part::bytes(data).file_name(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ApiClient::new("http://dialcast.local:3000/", None).unwrap();
        assert_eq!(client.base_url(), "http://dialcast.local:3000");
        assert_eq!(
            client.build_url("/make_calls"),
            "http://dialcast.local:3000/make_calls"
        );
    }

    #[test]
    fn protected_calls_need_a_token() {
        let client = ApiClient::new(DEFAULT_API_URL, Some("  ".to_string())).unwrap();
        let request = client.client.post(client.build_url("/make_calls"));
        let err = client.authorized(request).unwrap_err();
        assert!(err.to_string().contains("DIALCAST_TOKEN"));
    }

    #[tokio::test]
    async fn missing_upload_file_is_reported() {
        let err = file_part(Path::new("/nonexistent/dialcast/list.csv"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("list.csv"));
    }
}
