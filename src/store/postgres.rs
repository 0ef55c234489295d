use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use super::{ProductStore, UpdateOutcome, UserStore};
use crate::configuration::DatabaseSettings;
use crate::domain::{Product, TokenPair, UserRecord};
use crate::error::StoreError;

/// Document store on PostgreSQL: one JSONB document per row, unique
/// expression indexes on the user email and phone.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect, then apply pending migrations
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(settings.connection_string().expose_secret())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create connection pool");
                StoreError::Unavailable(e.to_string())
            })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to migrate the database");
                StoreError::Unavailable(e.to_string())
            })?;

        Ok(Self { pool })
    }

    async fn fetch_user(&self, sql: &str, key: &str) -> Result<Option<UserRecord>, StoreError> {
        let document = sqlx::query_scalar::<_, serde_json::Value>(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        document
            .map(serde_json::from_value::<UserRecord>)
            .transpose()
            .map_err(StoreError::from)
    }
}

fn decode_products(documents: Vec<serde_json::Value>) -> Result<Vec<Product>, StoreError> {
    documents
        .into_iter()
        .map(|d| serde_json::from_value::<Product>(d).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl UserStore for PgDocumentStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let document = serde_json::to_value(user)?;

        sqlx::query("INSERT INTO users (user_id, document) VALUES ($1, $2)")
            .bind(user.user_id)
            .bind(document)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE document->>'email' = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn count_by_phone(&self, phone: &str) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE document->>'phone' = $1",
        )
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.fetch_user("SELECT document FROM users WHERE document->>'email' = $1", email)
            .await
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let document = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT document FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        document
            .map(serde_json::from_value::<UserRecord>)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn update_tokens(
        &self,
        user_id: Uuid,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        // Single-statement merge: readers see the old pair or the new one, never a mix.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET document = document || jsonb_build_object(
                'token', $2::text,
                'refresh_token', $3::text,
                'updated_at', $4::text
            )
            WHERE user_id = $1
              AND (document->>'token' IS DISTINCT FROM $2::text
                   OR document->>'refresh_token' IS DISTINCT FROM $3::text)
            "#,
        )
        .bind(user_id)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Updated);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(if exists {
            UpdateOutcome::Unchanged
        } else {
            UpdateOutcome::NotFound
        })
    }
}

#[async_trait]
impl ProductStore for PgDocumentStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let document = serde_json::to_value(product)?;

        sqlx::query("INSERT INTO products (product_id, document) VALUES ($1, $2)")
            .bind(product.product_id)
            .bind(document)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let documents = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT document FROM products ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        decode_products(documents)
    }

    async fn search_products(&self, pattern: &str) -> Result<Vec<Product>, StoreError> {
        let documents = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT document FROM products WHERE document->>'name' ~ $1 ORDER BY created_at",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        decode_products(documents)
    }
}
