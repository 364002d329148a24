use dialcast_core::{models::TelephonyProvider, AppError, SealedSecret};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::with_transaction;

const PROVIDER_COLUMNS: &str =
    "id, user_id, sip_gateway_address, username, secret_hash, secret_sealed, created_at";

/// Repository for SIP gateway credentials.
///
/// Secrets arrive already sealed: the repository never sees a plaintext secret.
#[derive(Clone)]
pub struct TelephonyProviderRepository {
    pool: PgPool,
}

impl TelephonyProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, secret), fields(db.table = "telephony_providers", db.operation = "insert"))]
    pub async fn create_provider(
        &self,
        user_id: Uuid,
        sip_gateway_address: &str,
        username: &str,
        secret: &SealedSecret,
    ) -> Result<TelephonyProvider, AppError> {
        let provider = sqlx::query_as::<Postgres, TelephonyProvider>(&format!(
            r#"
            INSERT INTO telephony_providers (user_id, sip_gateway_address, username, secret_hash, secret_sealed)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PROVIDER_COLUMNS
        ))
        .bind(user_id)
        .bind(sip_gateway_address)
        .bind(username)
        .bind(&secret.hash)
        .bind(&secret.sealed)
        .fetch_one(&self.pool)
        .await?;

        Ok(provider)
    }

    #[tracing::instrument(skip(self), fields(db.table = "telephony_providers", db.operation = "select", db.record_id = %id))]
    pub async fn get_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TelephonyProvider>, AppError> {
        let provider = sqlx::query_as::<Postgres, TelephonyProvider>(&format!(
            "SELECT {} FROM telephony_providers WHERE user_id = $1 AND id = $2",
            PROVIDER_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    #[tracing::instrument(skip(self), fields(db.table = "telephony_providers", db.operation = "select"))]
    pub async fn list_providers(&self, user_id: Uuid) -> Result<Vec<TelephonyProvider>, AppError> {
        let providers = sqlx::query_as::<Postgres, TelephonyProvider>(&format!(
            "SELECT {} FROM telephony_providers WHERE user_id = $1 ORDER BY created_at DESC, id",
            PROVIDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    /// Most recently created provider of a user.
    #[tracing::instrument(skip(self), fields(db.table = "telephony_providers", db.operation = "select"))]
    pub async fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TelephonyProvider>, AppError> {
        let provider = sqlx::query_as::<Postgres, TelephonyProvider>(&format!(
            "SELECT {} FROM telephony_providers WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
            PROVIDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    /// Update fields that are `Some`. A new secret must be sealed by the caller.
    #[tracing::instrument(skip(self, secret), fields(db.table = "telephony_providers", db.operation = "update", db.record_id = %id))]
    pub async fn update_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
        sip_gateway_address: Option<&str>,
        username: Option<&str>,
        secret: Option<&SealedSecret>,
    ) -> Result<Option<TelephonyProvider>, AppError> {
        let provider = sqlx::query_as::<Postgres, TelephonyProvider>(&format!(
            r#"
            UPDATE telephony_providers
            SET sip_gateway_address = COALESCE($3, sip_gateway_address),
                username = COALESCE($4, username),
                secret_hash = COALESCE($5, secret_hash),
                secret_sealed = COALESCE($6, secret_sealed)
            WHERE user_id = $1 AND id = $2
            RETURNING {}
            "#,
            PROVIDER_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .bind(sip_gateway_address)
        .bind(username)
        .bind(secret.map(|s| s.hash.as_str()))
        .bind(secret.map(|s| s.sealed.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    /// Delete a provider and any campaign settings that point at it, atomically.
    #[tracing::instrument(skip(self), fields(db.table = "telephony_providers", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_provider(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                let detached = sqlx::query(
                    "DELETE FROM campaign_settings WHERE user_id = $1 AND provider_id = $2",
                )
                .bind(user_id)
                .bind(id)
                .execute(&mut **tx)
                .await?;

                let deleted =
                    sqlx::query("DELETE FROM telephony_providers WHERE user_id = $1 AND id = $2")
                        .bind(user_id)
                        .bind(id)
                        .execute(&mut **tx)
                        .await?;

                if detached.rows_affected() > 0 {
                    tracing::info!(
                        provider_id = %id,
                        "Removed campaign settings referencing deleted provider"
                    );
                }

                Ok(deleted.rows_affected() > 0)
            })
        })
        .await
    }
}
