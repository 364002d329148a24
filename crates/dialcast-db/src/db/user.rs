use dialcast_core::{models::User, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::{is_unique_violation, with_transaction};

/// Repository for registered accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account. `password_hash` must already be hashed.
    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let result = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
                "A user with that username already exists.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete an account together with everything it owns, in one transaction.
    ///
    /// Returns the storage keys of the removed audio files so the caller can drop the
    /// blobs, or `None` when the user did not exist.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<Option<Vec<String>>, AppError> {
        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                let locked = sqlx::query_scalar::<Postgres, Uuid>(
                    "SELECT id FROM users WHERE id = $1 FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
                if locked.is_none() {
                    return Ok(None);
                }

                sqlx::query("DELETE FROM access_tokens WHERE user_id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query("DELETE FROM campaign_settings WHERE user_id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query("DELETE FROM subscribers WHERE user_id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                let storage_keys = sqlx::query_scalar::<Postgres, String>(
                    "DELETE FROM audio_files WHERE user_id = $1 RETURNING storage_key",
                )
                .bind(id)
                .fetch_all(&mut **tx)
                .await?;
                sqlx::query("DELETE FROM telephony_providers WHERE user_id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;

                Ok(Some(storage_keys))
            })
        })
        .await
    }
}
