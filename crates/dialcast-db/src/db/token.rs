use chrono::{DateTime, Utc};
use dialcast_core::{models::AccessToken, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const TOKEN_COLUMNS: &str =
    "id, user_id, token_hash, token_prefix, expires_at, revoked_at, created_at";

/// Repository for login access tokens. Only argon2 hashes are stored; the clear
/// prefix narrows the lookup before verification.
#[derive(Clone)]
pub struct AccessTokenRepository {
    pool: PgPool,
}

impl AccessTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, token_hash), fields(db.table = "access_tokens", db.operation = "insert"))]
    pub async fn create_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        token_prefix: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AppError> {
        let token = sqlx::query_as::<Postgres, AccessToken>(&format!(
            r#"
            INSERT INTO access_tokens (user_id, token_hash, token_prefix, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TOKEN_COLUMNS
        ))
        .bind(user_id)
        .bind(token_hash)
        .bind(token_prefix)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Unrevoked, unexpired tokens sharing a prefix.
    #[tracing::instrument(skip(self), fields(db.table = "access_tokens", db.operation = "select"))]
    pub async fn find_active_by_prefix(
        &self,
        token_prefix: &str,
    ) -> Result<Vec<AccessToken>, AppError> {
        let tokens = sqlx::query_as::<Postgres, AccessToken>(&format!(
            r#"
            SELECT {}
            FROM access_tokens
            WHERE token_prefix = $1 AND revoked_at IS NULL AND expires_at > NOW()
            "#,
            TOKEN_COLUMNS
        ))
        .bind(token_prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    #[tracing::instrument(skip(self), fields(db.table = "access_tokens", db.operation = "update", db.record_id = %id))]
    pub async fn revoke_token(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE access_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
