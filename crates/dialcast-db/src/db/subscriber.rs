use dialcast_core::{
    models::{IngestReport, Subscriber},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::with_transaction;

const SUBSCRIBER_COLUMNS: &str = "id, user_id, phone_number, created_at";

/// Repository for subscriber phone numbers
#[derive(Clone)]
pub struct SubscriberRepository {
    pool: PgPool,
}

impl SubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All subscribers of a user in insertion order.
    #[tracing::instrument(skip(self), fields(db.table = "subscribers", db.operation = "select"))]
    pub async fn list_subscribers(&self, user_id: Uuid) -> Result<Vec<Subscriber>, AppError> {
        let subscribers = sqlx::query_as::<Postgres, Subscriber>(&format!(
            "SELECT {} FROM subscribers WHERE user_id = $1 ORDER BY seq",
            SUBSCRIBER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscribers", db.operation = "select", db.record_id = %id))]
    pub async fn get_subscriber(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<Postgres, Subscriber>(&format!(
            "SELECT {} FROM subscribers WHERE user_id = $1 AND id = $2",
            SUBSCRIBER_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber)
    }

    /// Insert one already-normalized number.
    #[tracing::instrument(skip(self), fields(db.table = "subscribers", db.operation = "insert"))]
    pub async fn create_subscriber(
        &self,
        user_id: Uuid,
        phone_number: &str,
    ) -> Result<Subscriber, AppError> {
        let subscriber = sqlx::query_as::<Postgres, Subscriber>(&format!(
            "INSERT INTO subscribers (user_id, phone_number) VALUES ($1, $2) RETURNING {}",
            SUBSCRIBER_COLUMNS
        ))
        .bind(user_id)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(subscriber)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscribers", db.operation = "update", db.record_id = %id))]
    pub async fn update_subscriber(
        &self,
        user_id: Uuid,
        id: Uuid,
        phone_number: &str,
    ) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<Postgres, Subscriber>(&format!(
            "UPDATE subscribers SET phone_number = $3 WHERE user_id = $1 AND id = $2 RETURNING {}",
            SUBSCRIBER_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscribers", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_subscriber(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a batch of numbers, optionally clearing the user's existing list first.
    ///
    /// Clear and insert share one transaction: a failure leaves the previous list intact.
    #[tracing::instrument(skip(self, phone_numbers), fields(db.table = "subscribers", db.operation = "replace", count = phone_numbers.len()))]
    pub async fn replace_for_user(
        &self,
        user_id: Uuid,
        phone_numbers: Vec<String>,
        clear: bool,
    ) -> Result<IngestReport, AppError> {
        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                let cleared = if clear {
                    sqlx::query("DELETE FROM subscribers WHERE user_id = $1")
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected()
                } else {
                    0
                };

                // UNNEST WITH ORDINALITY keeps file order in the identity column.
                let inserted = if phone_numbers.is_empty() {
                    0
                } else {
                    sqlx::query(
                        r#"
                        INSERT INTO subscribers (user_id, phone_number)
                        SELECT $1, n.phone_number
                        FROM UNNEST($2::text[]) WITH ORDINALITY AS n(phone_number, ord)
                        ORDER BY n.ord
                        "#,
                    )
                    .bind(user_id)
                    .bind(&phone_numbers)
                    .execute(&mut **tx)
                    .await?
                    .rows_affected() as usize
                };

                Ok(IngestReport { inserted, cleared })
            })
        })
        .await
    }
}
