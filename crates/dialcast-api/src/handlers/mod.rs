//! HTTP handlers
//!
//! `workflow` drives the guided provider → audio → subscribers → calls sequence; the
//! other modules are the REST resources under `/api/v1`.

pub mod accounts;
pub mod audio_files;
pub mod providers;
pub mod settings;
pub mod subscribers;
pub mod workflow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain `{"message": ...}` body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
