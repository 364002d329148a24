use dialcast_core::{
    models::{AudioFile, NewAudioFile},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::with_transaction;

const AUDIO_COLUMNS: &str = "id, user_id, name, original_filename, storage_key, content_type, file_size, duration_ms, created_at";

/// Repository for uploaded audio messages
#[derive(Clone)]
pub struct AudioFileRepository {
    pool: PgPool,
}

impl AudioFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, audio), fields(db.table = "audio_files", db.operation = "insert", user_id = %audio.user_id))]
    pub async fn create_audio_file(&self, audio: NewAudioFile) -> Result<AudioFile, AppError> {
        let created = sqlx::query_as::<Postgres, AudioFile>(&format!(
            r#"
            INSERT INTO audio_files (user_id, name, original_filename, storage_key, content_type, file_size, duration_ms)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            AUDIO_COLUMNS
        ))
        .bind(audio.user_id)
        .bind(&audio.name)
        .bind(&audio.original_filename)
        .bind(&audio.storage_key)
        .bind(&audio.content_type)
        .bind(audio.file_size)
        .bind(audio.duration_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select", db.record_id = %id))]
    pub async fn get_audio_file(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AudioFile>, AppError> {
        let audio = sqlx::query_as::<Postgres, AudioFile>(&format!(
            "SELECT {} FROM audio_files WHERE user_id = $1 AND id = $2",
            AUDIO_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(audio)
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select"))]
    pub async fn list_audio_files(&self, user_id: Uuid) -> Result<Vec<AudioFile>, AppError> {
        let files = sqlx::query_as::<Postgres, AudioFile>(&format!(
            "SELECT {} FROM audio_files WHERE user_id = $1 ORDER BY created_at DESC, id",
            AUDIO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Most recently uploaded audio file of a user.
    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select"))]
    pub async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<AudioFile>, AppError> {
        let audio = sqlx::query_as::<Postgres, AudioFile>(&format!(
            "SELECT {} FROM audio_files WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
            AUDIO_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(audio)
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "update", db.record_id = %id))]
    pub async fn rename_audio_file(
        &self,
        user_id: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<AudioFile>, AppError> {
        let audio = sqlx::query_as::<Postgres, AudioFile>(&format!(
            "UPDATE audio_files SET name = $3 WHERE user_id = $1 AND id = $2 RETURNING {}",
            AUDIO_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(audio)
    }

    /// Delete an audio file and any campaign settings that point at it, atomically.
    /// Returns the deleted row so the caller can remove the stored blob.
    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_audio_file(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AudioFile>, AppError> {
        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                sqlx::query(
                    "DELETE FROM campaign_settings WHERE user_id = $1 AND audio_file_id = $2",
                )
                .bind(user_id)
                .bind(id)
                .execute(&mut **tx)
                .await?;

                let deleted = sqlx::query_as::<Postgres, AudioFile>(&format!(
                    "DELETE FROM audio_files WHERE user_id = $1 AND id = $2 RETURNING {}",
                    AUDIO_COLUMNS
                ))
                .bind(user_id)
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

                Ok(deleted)
            })
        })
        .await
    }
}
