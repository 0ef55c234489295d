/// JWT Token Issuance and Validation
///
/// Both sides are built once from the process-wide `JwtSettings` and hold
/// their keys for the life of the server. HS256 only.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::claims::{Claims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::domain::TokenPair;
use crate::error::{AppError, AuthError};

/// Mints access/refresh token pairs
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
            issuer: config.issuer.clone(),
        }
    }

    /// Issue a pair for the user, stamped with the current time
    ///
    /// # Errors
    /// Returns error if signing fails; an unsigned token is never produced.
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<TokenPair, AppError> {
        self.issue_at(chrono::Utc::now().timestamp(), user_id, email, first_name, last_name)
    }

    /// Issue a pair as if the clock read `now` (Unix seconds)
    pub fn issue_at(
        &self,
        now: i64,
        user_id: Uuid,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<TokenPair, AppError> {
        let claims = Claims::new(
            user_id,
            email,
            first_name,
            last_name,
            now,
            self.access_token_expiry,
            &self.issuer,
        );
        let refresh_claims = RefreshClaims::new(user_id, now, self.refresh_token_expiry, &self.issuer);

        Ok(TokenPair {
            access_token: self.sign(&claims)?,
            refresh_token: self.sign(&refresh_claims)?,
        })
    }

    fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            AppError::Internal(format!("Token generation failed: {}", e))
        })
    }
}

/// Verifies signature, issuer and expiry, then hands back the claims
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        // A token is expired the second its `exp` passes.
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Validate an access token
    ///
    /// # Errors
    /// - `TokenMalformed`: not a parsable JWT or the claims do not fit
    /// - `TokenExpired`: `exp` is in the past
    /// - `InvalidSignature`: signature, algorithm or issuer mismatch
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_claims(token)
    }

    /// Validate a refresh token with the same rules
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.decode_claims(token)
    }

    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, AuthError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidIssuer => AuthError::InvalidSignature,
                    _ => AuthError::TokenMalformed,
                };
                tracing::debug!(error = %e, "JWT validation error");
                err
            })
    }
}
