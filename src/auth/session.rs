/// Refresh Token Session Storage
///
/// Thin adapter over the user store's single refresh token field. Store
/// failures are passed through untouched; callers decide what they mean.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::UserStore;

#[derive(Clone)]
pub struct SessionStore {
    users: Arc<dyn UserStore>,
}

impl SessionStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Unconditionally overwrite the stored refresh token
    pub async fn set_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), DatabaseError> {
        self.users.update_refresh_token(user_id, Some(token)).await
    }

    /// Remove the stored refresh token (logout)
    pub async fn clear_refresh_token(&self, user_id: Uuid) -> Result<(), DatabaseError> {
        self.users.update_refresh_token(user_id, None).await
    }

    /// # Errors
    /// `DatabaseError::NotFound` if the user no longer exists
    pub async fn get_stored_refresh_token(
        &self,
        user_id: Uuid,
    ) -> Result<Option<String>, DatabaseError> {
        let user = self.users.find_by_id(user_id).await?;
        Ok(user.refresh_token.filter(|token| !token.is_empty()))
    }

    /// Store `next` only if `current` is still the stored token
    pub async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, DatabaseError> {
        self.users.replace_refresh_token(user_id, current, next).await
    }
}

/// Compare a presented token against the stored one
///
/// Compares SHA-256 digests so the time taken does not depend on how long
/// a common prefix the two strings share.
pub fn tokens_match(presented: &str, stored: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(stored.as_bytes())
}
