use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::product::{Address, Order, Product};

/// One-way bcrypt digest of a password. Only ever compared through
/// `auth::verify_password`; `Debug` never prints the digest.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn from_digest(digest: String) -> Self {
        Self(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Access + refresh token issued together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signup input after boundary validation; every field is present.
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: Secret<String>,
}

/// User document as persisted in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: Credential,
    pub token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user_cart: Vec<Product>,
    #[serde(default, rename = "address")]
    pub address_details: Vec<Address>,
    #[serde(default, rename = "orders")]
    pub order_status: Vec<Order>,
}

impl UserRecord {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access_token: self.token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    pub fn set_tokens(&mut self, tokens: &TokenPair, updated_at: DateTime<Utc>) {
        self.token = tokens.access_token.clone();
        self.refresh_token = tokens.refresh_token.clone();
        self.updated_at = updated_at;
    }
}

/// Public view of a user record: everything except the credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_cart: Vec<Product>,
    #[serde(rename = "address")]
    pub address_details: Vec<Address>,
    #[serde(rename = "orders")]
    pub order_status: Vec<Order>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            token: record.token,
            refresh_token: record.refresh_token,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user_cart: record.user_cart,
            address_details: record.address_details,
            order_status: record.order_status,
        }
    }
}
