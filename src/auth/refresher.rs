/// Token Persistence
///
/// Writes a freshly issued pair onto the owning user record. The access
/// token, refresh token and `updated_at` change in one document update, so
/// concurrent logins leave exactly one complete pair behind (last write wins).

use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::TokenPair;
use crate::error::{AppError, StoreError};
use crate::store::{with_timeout, UpdateOutcome, UserStore};

/// Persist `tokens` on the record of `user_id`
///
/// Writing a pair the record already holds is a no-op, so repeating the
/// call leaves the same observable state.
///
/// # Errors
/// - `StoreError::NotFound` if no record has this id
/// - `StoreError::Timeout` if the store does not answer within `limit`
pub async fn refresh_and_persist(
    users: &dyn UserStore,
    tokens: &TokenPair,
    user_id: Uuid,
    limit: Duration,
) -> Result<UpdateOutcome, AppError> {
    let outcome = with_timeout(limit, users.update_tokens(user_id, tokens, Utc::now())).await?;

    match outcome {
        UpdateOutcome::NotFound => {
            tracing::warn!(user_id = %user_id, "Token update for unknown user");
            Err(StoreError::NotFound(format!("user {}", user_id)).into())
        }
        UpdateOutcome::Unchanged => {
            tracing::debug!(user_id = %user_id, "Token pair already stored");
            Ok(outcome)
        }
        UpdateOutcome::Updated => {
            tracing::info!(user_id = %user_id, "Token pair persisted");
            Ok(outcome)
        }
    }
}
