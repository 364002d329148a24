//! Multipart form reading shared by the upload endpoints.

use crate::error::HttpAppError;
use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::Path;

/// The single file part of an upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Text fields plus the part named `file`, if one was sent.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Checkbox semantics: `true`, `on`, `1` and `yes` are set, anything else is not.
    pub fn flag(&self, name: &str) -> bool {
        parse_flag(self.text(name))
    }
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Keep only the final path component of a client-supplied filename.
pub fn sanitize_filename(filename: &str) -> String {
    let normalized = filename.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string())
}

/// Read a whole multipart body. A later `file` part replaces an earlier one.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, HttpAppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let filename = sanitize_filename(field.file_name().unwrap_or_default());
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?.to_vec();
            form.file = Some(UploadedFile {
                filename,
                content_type,
                data,
            });
        } else if !name.is_empty() {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\list.csv"), "list.csv");
        assert_eq!(sanitize_filename("greeting.mp3"), "greeting.mp3");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("on"));
        assert!(parse_flag("True"));
        assert!(parse_flag("1"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("off"));
    }
}
