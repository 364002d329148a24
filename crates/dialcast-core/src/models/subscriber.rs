use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Subscriber {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubscriberRequest {
    pub phone_number: String,
}

/// Result of one subscriber list upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngestReport {
    /// Rows inserted from the upload.
    pub inserted: usize,
    /// Rows removed beforehand because the clear flag was set.
    pub cleared: u64,
}
