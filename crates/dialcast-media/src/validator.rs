use dialcast_core::constants::{AUDIO_ALLOWED_CONTENT_TYPES, AUDIO_ALLOWED_EXTENSIONS};
use dialcast_core::validation::{file_extension, ValidationErrors, REQUIRED};

use crate::audio::{decode_mp3, PcmAudio};

/// Common validation errors for uploaded audio
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File size {size} bytes exceeds maximum allowed size of {max} bytes.")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported file format. Please upload an MP3 file.")]
    InvalidExtension { extension: String },

    #[error("Content type '{content_type}' is not allowed.")]
    InvalidContentType { content_type: String },

    #[error("The submitted file is not a decodable MP3: {0}")]
    Undecodable(String),

    #[error("The submitted file is empty.")]
    EmptyFile,
}

/// Audio upload validator
///
/// Each check is available on its own; [`MediaValidator::validate_upload`] runs all of
/// them and reports every failure together.
pub struct MediaValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    /// Validator for MP3 messages up to `max_file_size` bytes.
    pub fn mp3(max_file_size: usize) -> Self {
        Self::new(
            max_file_size,
            AUDIO_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            AUDIO_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension (case-insensitive)
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = file_extension(filename).unwrap_or_default();

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension { extension });
        }

        Ok(())
    }

    /// Validate content type. `application/octet-stream` is accepted because browsers
    /// commonly send it for MP3; the decode check covers that case.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if normalized == "application/octet-stream" {
            return Ok(());
        }

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Confirm the bytes decode as MP3.
    pub fn validate_decodes(&self, data: &[u8]) -> Result<PcmAudio, ValidationError> {
        decode_mp3(data).map_err(|e| ValidationError::Undecodable(e.to_string()))
    }

    /// Run every upload check and collect the violations.
    ///
    /// The decode check is skipped when the size check already failed, so oversized
    /// uploads are never decoded. Returns the decoded audio on success.
    pub fn validate_upload(
        &self,
        name: &str,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<PcmAudio, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(!name.trim().is_empty(), "name", REQUIRED);

        if let Err(e) = self.validate_extension(filename) {
            errors.push("file", e.to_string());
        }
        if let Some(ct) = content_type {
            if let Err(e) = self.validate_content_type(ct) {
                errors.push("file", e.to_string());
            }
        }

        let size_ok = match self.validate_file_size(data.len()) {
            Ok(()) => true,
            Err(e) => {
                errors.push("file", e.to_string());
                false
            }
        };

        let decoded = if size_ok {
            match self.validate_decodes(data) {
                Ok(pcm) => Some(pcm),
                Err(e) => {
                    errors.push("file", e.to_string());
                    None
                }
            }
        } else {
            None
        };

        match decoded {
            Some(pcm) if errors.is_empty() => Ok(pcm),
            _ => Err(errors),
        }
    }
}
