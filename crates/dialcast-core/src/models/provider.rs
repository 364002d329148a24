use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// SIP gateway credentials owned by one user.
///
/// `secret_hash` is an argon2 PHC string and `secret_sealed` the AES-GCM sealed secret
/// used to answer digest challenges. Neither is ever serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TelephonyProvider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sip_gateway_address: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub secret_hash: String,
    #[serde(skip_serializing)]
    pub secret_sealed: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProviderRequest {
    pub sip_gateway_address: String,
    pub username: String,
    pub password: String,
}

/// Partial update; a present `password` is re-sealed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProviderRequest {
    pub sip_gateway_address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderResponse {
    pub id: Uuid,
    pub sip_gateway_address: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<TelephonyProvider> for ProviderResponse {
    fn from(provider: TelephonyProvider) -> Self {
        ProviderResponse {
            id: provider.id,
            sip_gateway_address: provider.sip_gateway_address,
            username: provider.username,
            created_at: provider.created_at,
        }
    }
}
