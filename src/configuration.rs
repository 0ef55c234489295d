use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::error::ConfigError as SettingsError;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// bcrypt cost for new credentials
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_hash_cost() -> u32 {
    crate::auth::HASH_COST
}

/// Which document store backs the service
#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Postgres,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub kind: StoreKind,
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret")]
    pub password: Secret<String>,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_max_connections() -> u32 {
    5
}

impl DatabaseSettings {
    /// Server URL without a database, for creating one
    pub fn connection_string_without_db(&self) -> Secret<String> {
        Secret::new(format!(
            "postgres://{}:{}@{}:{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port
        ))
    }

    pub fn connection_string(&self) -> Secret<String> {
        Secret::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database_name
        ))
    }
}

/// Bounds every document store call made on behalf of a request
#[derive(serde::Deserialize, Clone)]
pub struct StoreSettings {
    pub timeout_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    pub access_token_expiry: i64,   // seconds (86400 = 24 hours)
    pub refresh_token_expiry: i64,  // seconds (604800 = 7 days)
    pub issuer: String,
}

impl JwtSettings {
    /// Rejects secrets too short for HS256 and non-positive lifetimes
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.secret.expose_secret().len() < MIN_JWT_SECRET_LENGTH {
            return Err(SettingsError::InvalidValue(format!(
                "jwt.secret must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(SettingsError::InvalidValue(
                "jwt token expiry must be positive".to_string(),
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(SettingsError::MissingRequired("jwt.issuer".to_string()));
        }
        Ok(())
    }
}

/// Loads `configuration.{yaml,toml,json}` (optional) overlaid with
/// `APP_`-prefixed environment variables, e.g. `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: Secret::new(secret.to_string()),
            access_token_expiry: 86400,
            refresh_token_expiry: 604800,
            issuer: "storefront".to_string(),
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(jwt("too-short").validate().is_err());
        assert!(jwt("a-secret-that-is-long-enough-for-hs256!").validate().is_ok());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut settings = jwt("a-secret-that-is-long-enough-for-hs256!");
        settings.access_token_expiry = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_store_timeout_default() {
        assert_eq!(StoreSettings::default().timeout(), Duration::from_secs(10));
    }
}
