use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Uploaded MP3 message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AudioFile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub original_filename: String,
    pub storage_key: String,
    pub content_type: String,
    pub file_size: i64,
    pub duration_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Fields the repository needs to insert a new audio row.
#[derive(Debug, Clone)]
pub struct NewAudioFile {
    pub user_id: Uuid,
    pub name: String,
    pub original_filename: String,
    pub storage_key: String,
    pub content_type: String,
    pub file_size: i64,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAudioFileRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AudioFileResponse {
    pub id: Uuid,
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<AudioFile> for AudioFileResponse {
    fn from(audio: AudioFile) -> Self {
        AudioFileResponse {
            id: audio.id,
            name: audio.name,
            filename: audio.original_filename,
            content_type: audio.content_type,
            file_size: audio.file_size,
            duration_ms: audio.duration_ms,
            created_at: audio.created_at,
        }
    }
}
