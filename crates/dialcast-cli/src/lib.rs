//! Dialcast CLI library: the HTTP client and output helpers behind the `dialcast`
//! binary.

pub mod client;

pub use client::ApiClient;

use serde_json::Value;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Human-readable form of an API error body.
///
/// Understands the `{"error", "details": [{"field", "message"}]}` envelope and falls
/// back to the raw text for anything else.
pub fn describe_api_error(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let Some(error) = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
    else {
        let body = body.trim();
        return if body.is_empty() {
            format!("API request failed with status {}", status)
        } else {
            format!("API request failed with status {}: {}", status, body)
        };
    };

    let mut message = format!("{} ({})", error, status);
    let details = parsed
        .as_ref()
        .and_then(|v| v.get("details"))
        .and_then(Value::as_array);
    for detail in details.into_iter().flatten() {
        let field = detail.get("field").and_then(Value::as_str).unwrap_or("-");
        let text = detail.get("message").and_then(Value::as_str).unwrap_or("");
        message.push_str(&format!("\n  {}: {}", field, text));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_plain_error() {
        let body = r#"{"error":"Token is required."}"#;
        assert_eq!(describe_api_error(401, body), "Token is required. (401)");
    }

    #[test]
    fn describe_validation_details() {
        let body = r#"{"error":"Validation failed","details":[
            {"field":"username","message":"This field is required."},
            {"field":"password2","message":"The two password fields didn't match."}
        ]}"#;
        let text = describe_api_error(422, body);
        assert!(text.starts_with("Validation failed (422)"));
        assert!(text.contains("\n  username: This field is required."));
        assert!(text.contains("\n  password2: The two password fields didn't match."));
    }

    #[test]
    fn describe_non_json_body() {
        assert_eq!(
            describe_api_error(429, "Too many failed auth attempts"),
            "API request failed with status 429: Too many failed auth attempts"
        );
        assert_eq!(
            describe_api_error(502, ""),
            "API request failed with status 502"
        );
    }
}
