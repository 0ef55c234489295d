/// JWT Claims structures
///
/// Payloads of the access and refresh tokens, plus the identity the
/// authentication gate attaches to a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Build access claims valid for `expiry_seconds` from `now`
    pub fn new(
        user_id: Uuid,
        email: &str,
        first_name: &str,
        last_name: &str,
        now: i64,
        expiry_seconds: i64,
        issuer: &str,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// A subject that is not a UUID means the token was not minted here.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenMalformed)
    }
}

/// Claims carried by a refresh token: subject only
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, now: i64, expiry_seconds: i64, issuer: &str) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
        }
    }
}

/// Identity injected into request extensions by the JWT middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email,
        })
    }
}
