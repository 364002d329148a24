use std::path::Path;

use validator::ValidateEmail;

use super::ValidationErrors;
use crate::constants::SUBSCRIBER_ALLOWED_EXTENSIONS;

pub const REQUIRED: &str = "This field is required.";
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_FIELD_LENGTH: usize = 255;

/// Lower-cased extension of an uploaded filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Provider fields: gateway address, username, secret.
pub fn validate_provider(
    sip_gateway_address: &str,
    username: &str,
    secret: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let address = sip_gateway_address.trim();
    errors.check(!address.is_empty(), "sip_gateway_address", REQUIRED);
    errors.check(
        !address.chars().any(char::is_whitespace),
        "sip_gateway_address",
        "Gateway address must not contain whitespace.",
    );
    errors.check(
        address.len() <= MAX_FIELD_LENGTH,
        "sip_gateway_address",
        "Ensure this field has no more than 255 characters.",
    );

    errors.check(!username.trim().is_empty(), "username", REQUIRED);
    errors.check(
        username.len() <= MAX_FIELD_LENGTH,
        "username",
        "Ensure this field has no more than 255 characters.",
    );

    errors.check(!secret.trim().is_empty(), "password", REQUIRED);

    errors.into_result()
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password1: &str,
    password2: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(!username.trim().is_empty(), "username", REQUIRED);
    errors.check(
        username.len() <= 150,
        "username",
        "Ensure this field has no more than 150 characters.",
    );

    if email.trim().is_empty() {
        errors.push("email", REQUIRED);
    } else {
        errors.check(
            email.validate_email(),
            "email",
            "Enter a valid email address.",
        );
    }

    errors.check(
        password1.chars().count() >= MIN_PASSWORD_LENGTH,
        "password1",
        "This password is too short. It must contain at least 8 characters.",
    );
    errors.check(
        password1 == password2,
        "password2",
        "The two password fields didn't match.",
    );

    errors.into_result()
}

pub fn validate_subscriber_upload(filename: &str, size: usize) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let ext_ok = file_extension(filename)
        .map(|ext| SUBSCRIBER_ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    errors.check(ext_ok, "file", "Please upload a CSV or TXT file.");
    errors.check(size > 0, "file", "The submitted file is empty.");

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_reports_every_missing_field() {
        let errors = validate_provider("  ", "", "").unwrap_err();
        assert!(errors.has_field("sip_gateway_address"));
        assert!(errors.has_field("username"));
        assert!(errors.has_field("password"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_provider_accepts_complete_input() {
        assert!(validate_provider("sip.example.com", "alice", "s3cret").is_ok());
    }

    #[test]
    fn test_provider_rejects_whitespace_in_address() {
        let errors = validate_provider("sip example.com", "alice", "s3cret").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("sip_gateway_address"));
    }

    #[test]
    fn test_registration_collects_all_problems() {
        let errors = validate_registration("", "not-an-email", "short", "other").unwrap_err();
        assert!(errors.has_field("username"));
        assert!(errors.has_field("email"));
        assert!(errors.has_field("password1"));
        assert!(errors.has_field("password2"));
    }

    #[test]
    fn test_registration_ok() {
        assert!(validate_registration("bob", "bob@example.com", "longenough", "longenough").is_ok());
    }

    #[test]
    fn test_subscriber_upload_extensions() {
        assert!(validate_subscriber_upload("list.csv", 10).is_ok());
        assert!(validate_subscriber_upload("LIST.TXT", 10).is_ok());
        let errors = validate_subscriber_upload("list.xlsx", 10).unwrap_err();
        assert_eq!(errors.violations[0].message, "Please upload a CSV or TXT file.");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a/b/c.Mp3").as_deref(), Some("mp3"));
        assert_eq!(file_extension("noext"), None);
    }
}
