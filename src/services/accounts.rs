//! Account service: signup and login

use chrono::Utc;
use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::{hash_password_with_cost, refresh_and_persist, verify_password, TokenIssuer};
use crate::domain::{Credential, NewUser, UserProfile, UserRecord};
use crate::error::{AppError, AuthError, ConflictError};
use crate::store::{with_timeout, UserStore};

pub struct AccountService {
    users: Arc<dyn UserStore>,
    issuer: Arc<TokenIssuer>,
    hash_cost: u32,
    store_timeout: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        issuer: Arc<TokenIssuer>,
        hash_cost: u32,
        store_timeout: Duration,
    ) -> Self {
        Self {
            users,
            issuer,
            hash_cost,
            store_timeout,
        }
    }

    /// Create a user record holding a hashed credential and a fresh token pair
    ///
    /// # Errors
    /// - `DuplicateEmail` / `DuplicatePhone` if either is already registered
    /// - `Fatal` if hashing fails; nothing is stored
    pub async fn signup(&self, new_user: NewUser) -> Result<UserRecord, AppError> {
        if with_timeout(self.store_timeout, self.users.count_by_email(&new_user.email)).await? > 0 {
            return Err(ConflictError::DuplicateEmail.into());
        }
        if with_timeout(self.store_timeout, self.users.count_by_phone(&new_user.phone)).await? > 0 {
            return Err(ConflictError::DuplicatePhone.into());
        }

        let credential = self.hash(new_user.password).await?;

        let user_id = Uuid::new_v4();
        let tokens = self.issuer.issue(
            user_id,
            &new_user.email,
            &new_user.first_name,
            &new_user.last_name,
        )?;

        let now = Utc::now();
        let record = UserRecord {
            user_id,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            phone: new_user.phone,
            password: credential,
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            created_at: now,
            updated_at: now,
            user_cart: Vec::new(),
            address_details: Vec::new(),
            order_status: Vec::new(),
        };

        // The unique indexes still guard against a concurrent signup slipping
        // past the counts above.
        with_timeout(self.store_timeout, self.users.insert_user(&record)).await?;

        tracing::info!(user_id = %user_id, "User registered");
        Ok(record)
    }

    /// Check credentials, mint a new pair and persist it on the record
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password; in
    /// that case no token is issued.
    pub async fn login(&self, email: &str, password: Secret<String>) -> Result<UserProfile, AppError> {
        let mut user = with_timeout(self.store_timeout, self.users.find_by_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify(password, user.password.clone()).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self
            .issuer
            .issue(user.user_id, &user.email, &user.first_name, &user.last_name)?;

        refresh_and_persist(self.users.as_ref(), &tokens, user.user_id, self.store_timeout).await?;

        user.set_tokens(&tokens, Utc::now());
        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(UserProfile::from(user))
    }

    /// bcrypt is CPU-bound; keep it off the async workers.
    async fn hash(&self, password: Secret<String>) -> Result<Credential, AppError> {
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| AppError::Fatal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: Secret<String>, credential: Credential) -> Result<bool, AppError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &credential))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenValidator;
    use crate::configuration::JwtSettings;
    use crate::store::MemoryStore;

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: Secret::new("test-secret-key-at-least-32-characters-long".to_string()),
            access_token_expiry: 86400,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn service(store: Arc<MemoryStore>) -> AccountService {
        AccountService::new(
            store,
            Arc::new(TokenIssuer::new(&jwt_settings())),
            4,
            Duration::from_secs(10),
        )
    }

    fn new_user(email: &str, phone: &str) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: Secret::new("hunter22".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_stores_hash_and_tokens() {
        let store = Arc::new(MemoryStore::default());
        let accounts = service(store.clone());

        let record = accounts.signup(new_user("a@x.com", "5550100")).await.unwrap();
        let stored = store.find_by_id(record.user_id).await.unwrap().unwrap();

        assert_ne!(stored.password.as_str(), "hunter22");
        assert!(verify_password(&Secret::new("hunter22".to_string()), &stored.password));

        let claims = TokenValidator::new(&jwt_settings()).validate(&stored.token).unwrap();
        assert_eq!(claims.sub, record.user_id.to_string());
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let accounts = service(Arc::new(MemoryStore::default()));
        accounts.signup(new_user("a@x.com", "5550100")).await.unwrap();

        let result = accounts.signup(new_user("a@x.com", "5550101")).await;
        assert!(matches!(result, Err(AppError::Conflict(ConflictError::DuplicateEmail))));
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let accounts = service(Arc::new(MemoryStore::default()));
        accounts.signup(new_user("a@x.com", "5550100")).await.unwrap();

        let result = accounts.signup(new_user("b@x.com", "5550100")).await;
        assert!(matches!(result, Err(AppError::Conflict(ConflictError::DuplicatePhone))));
    }

    #[tokio::test]
    async fn test_login_wrong_password_issues_nothing() {
        let store = Arc::new(MemoryStore::default());
        let accounts = service(store.clone());
        let record = accounts.signup(new_user("a@x.com", "5550100")).await.unwrap();

        let result = accounts
            .login("a@x.com", Secret::new("wrong-password".to_string()))
            .await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidCredentials))));

        let stored = store.find_by_id(record.user_id).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let accounts = service(Arc::new(MemoryStore::default()));

        let result = accounts
            .login("nobody@x.com", Secret::new("hunter22".to_string()))
            .await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidCredentials))));
    }

    #[tokio::test]
    async fn test_login_returns_persisted_tokens() {
        let store = Arc::new(MemoryStore::default());
        let accounts = service(store.clone());
        let record = accounts.signup(new_user("a@x.com", "5550100")).await.unwrap();

        let profile = accounts
            .login("a@x.com", Secret::new("hunter22".to_string()))
            .await
            .unwrap();
        let stored = store.find_by_id(record.user_id).await.unwrap().unwrap();

        assert_eq!(profile.token, stored.token);
        assert_eq!(profile.refresh_token, stored.refresh_token);
        assert_eq!(profile.user_id, record.user_id);
    }
}
