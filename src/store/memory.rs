use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProductStore, UpdateOutcome, UserStore};
use crate::domain::{Product, TokenPair, UserRecord};
use crate::error::{StoreError, UniqueField};

/// In-process document store. Each write takes the collection lock, so an
/// update replaces a whole token pair at once.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    products: RwLock<Vec<Product>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateKey(UniqueField::Email));
        }
        if users.values().any(|u| u.phone == user.phone) {
            return Err(StoreError::DuplicateKey(UniqueField::Phone));
        }

        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn count_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.email == email).count() as u64)
    }

    async fn count_by_phone(&self, phone: &str) -> Result<u64, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.phone == phone).count() as u64)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn update_tokens(
        &self,
        user_id: Uuid,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut users = self.users.write().await;

        let Some(user) = users.get_mut(&user_id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if user.tokens() == *tokens {
            return Ok(UpdateOutcome::Unchanged);
        }

        user.set_tokens(tokens, updated_at);
        Ok(UpdateOutcome::Updated)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn search_products(&self, pattern: &str) -> Result<Vec<Product>, StoreError> {
        let matcher = Regex::new(pattern).map_err(|e| StoreError::Query(e.to_string()))?;
        let products = self.products.read().await;

        Ok(products
            .iter()
            .filter(|p| matcher.is_match(&p.name))
            .cloned()
            .collect())
    }
}
