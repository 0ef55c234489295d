/// Document store
///
/// Users and products are kept as whole JSON documents keyed by id. Two
/// backends: an in-process map (development and tests) and PostgreSQL with
/// JSONB columns. Every call made on behalf of a request goes through
/// `with_timeout`.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::configuration::{DatabaseSettings, StoreKind};
use crate::domain::{Product, TokenPair, UserRecord};
use crate::error::StoreError;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Result of writing a token pair onto a user record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The record already held this exact pair; nothing was written.
    Unchanged,
    NotFound,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new record. Email and phone are unique across records.
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    async fn count_by_email(&self, email: &str) -> Result<u64, StoreError>;

    async fn count_by_phone(&self, phone: &str) -> Result<u64, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Replace the stored pair and `updated_at` in a single atomic write
    async fn update_tokens(
        &self,
        user_id: Uuid,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Products whose name matches the regular expression `pattern`
    async fn search_products(&self, pattern: &str) -> Result<Vec<Product>, StoreError>;
}

/// Both collections, behind trait objects
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            users: store.clone(),
            products: store,
        }
    }

    /// Open the backend named by the settings
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        match settings.kind {
            StoreKind::Memory => {
                tracing::info!("Using in-memory document store");
                Ok(Self::in_memory())
            }
            StoreKind::Postgres => {
                let store = Arc::new(PgDocumentStore::connect(settings).await?);
                tracing::info!("Connected to PostgreSQL document store");
                Ok(Self {
                    users: store.clone(),
                    products: store,
                })
            }
        }
    }
}

/// Bound a store call. On expiry the inner future is dropped, which cancels
/// the in-flight operation; it is not retried.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(timeout_secs = limit.as_secs(), "Store operation timed out");
            Err(StoreError::Timeout(limit))
        }
    }
}
