/// Password Hashing and Verification
///
/// bcrypt with a per-call salt embedded in the digest, so no separate salt
/// storage is needed. bcrypt only reads the first 72 bytes of its input;
/// longer passwords are refused rather than silently cut.

use bcrypt::{non_truncating_hash, non_truncating_verify, BcryptError};
use secrecy::{ExposeSecret, Secret};

use crate::domain::Credential;
use crate::error::{AppError, ValidationError};

/// Work factor for stored credentials
pub const HASH_COST: u32 = 14;

/// Longest password, in bytes, bcrypt hashes in full
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with an explicit bcrypt cost
///
/// # Errors
/// - `Validation(TooLong)` if the password exceeds 72 bytes
/// - `Fatal` if bcrypt cannot complete (entropy source failure); the
///   caller must abort the operation
pub fn hash_password_with_cost(
    password: &Secret<String>,
    cost: u32,
) -> Result<Credential, AppError> {
    non_truncating_hash(password.expose_secret(), cost)
        .map(Credential::from_digest)
        .map_err(|e| match e {
            BcryptError::Truncation(_) => {
                ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES).into()
            }
            e => {
                tracing::error!(error = %e, "Password hashing failed");
                AppError::Fatal(format!("Password hashing failed: {}", e))
            }
        })
}

/// Verify a password against a stored credential
///
/// Returns `false` on mismatch, for passwords over 72 bytes, and when the
/// stored digest is malformed.
pub fn verify_password(password: &Secret<String>, credential: &Credential) -> bool {
    match non_truncating_verify(password.expose_secret(), credential.as_str()) {
        Ok(valid) => valid,
        Err(BcryptError::Truncation(_)) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Stored credential could not be parsed");
            false
        }
    }
}
