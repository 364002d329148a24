//! Dialcast Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all Dialcast components.

pub mod config;
pub mod constants;
pub mod encryption;
pub mod error;
pub mod models;
pub mod phone;
pub mod validation;

// Re-export commonly used types
pub use config::{CallConfig, Config};
pub use encryption::{SealedSecret, SecretSealer};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use phone::normalize_phone_number;
pub use validation::{FieldViolation, ValidationErrors};
