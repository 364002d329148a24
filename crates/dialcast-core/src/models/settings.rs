use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The per-user campaign configuration: which provider dials and which audio plays.
/// The subscriber set is every subscriber owned by the same user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CampaignSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub audio_file_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SettingsRequest {
    pub provider_id: Uuid,
    pub audio_file_id: Uuid,
}
