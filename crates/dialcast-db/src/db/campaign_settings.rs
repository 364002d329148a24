use dialcast_core::{models::CampaignSettings, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const SETTINGS_COLUMNS: &str =
    "id, user_id, provider_id, audio_file_id, created_at, updated_at";

/// Repository for the one-per-user campaign configuration
#[derive(Clone)]
pub struct CampaignSettingsRepository {
    pool: PgPool,
}

impl CampaignSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "campaign_settings", db.operation = "select"))]
    pub async fn get_for_user(&self, user_id: Uuid) -> Result<Option<CampaignSettings>, AppError> {
        let settings = sqlx::query_as::<Postgres, CampaignSettings>(&format!(
            "SELECT {} FROM campaign_settings WHERE user_id = $1",
            SETTINGS_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    #[tracing::instrument(skip(self), fields(db.table = "campaign_settings", db.operation = "select", db.record_id = %id))]
    pub async fn get_settings(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CampaignSettings>, AppError> {
        let settings = sqlx::query_as::<Postgres, CampaignSettings>(&format!(
            "SELECT {} FROM campaign_settings WHERE user_id = $1 AND id = $2",
            SETTINGS_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Create or replace the user's settings.
    ///
    /// Both references must belong to the same user; otherwise `NotFound`.
    #[tracing::instrument(skip(self), fields(db.table = "campaign_settings", db.operation = "upsert"))]
    pub async fn upsert_for_user(
        &self,
        user_id: Uuid,
        provider_id: Uuid,
        audio_file_id: Uuid,
    ) -> Result<CampaignSettings, AppError> {
        let settings = sqlx::query_as::<Postgres, CampaignSettings>(&format!(
            r#"
            INSERT INTO campaign_settings (user_id, provider_id, audio_file_id)
            SELECT $1, p.id, a.id
            FROM telephony_providers p, audio_files a
            WHERE p.id = $2 AND p.user_id = $1 AND a.id = $3 AND a.user_id = $1
            ON CONFLICT (user_id) DO UPDATE
            SET provider_id = EXCLUDED.provider_id,
                audio_file_id = EXCLUDED.audio_file_id,
                updated_at = NOW()
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        ))
        .bind(user_id)
        .bind(provider_id)
        .bind(audio_file_id)
        .fetch_optional(&self.pool)
        .await?;

        settings.ok_or_else(|| {
            AppError::NotFound("Provider or audio file not found for this user".to_string())
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "campaign_settings", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_settings(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM campaign_settings WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
