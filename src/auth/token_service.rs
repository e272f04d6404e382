/// Credential pair issuance and rotation
///
/// A pair is only handed out after its refresh token has been recorded in
/// the store. Any codec or store failure collapses into
/// `AuthError::TokenGeneration`; callers never see half a pair.

use serde::Serialize;
use uuid::Uuid;

use crate::auth::jwt::TokenCodec;
use crate::auth::session::SessionStore;
use crate::error::{AppError, AuthError, DatabaseError, TokenError};

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenService {
    access: TokenCodec,
    refresh: TokenCodec,
    access_ttl: i64,
    refresh_ttl: i64,
    sessions: SessionStore,
}

impl TokenService {
    pub fn new(
        access: TokenCodec,
        access_ttl: i64,
        refresh: TokenCodec,
        refresh_ttl: i64,
        sessions: SessionStore,
    ) -> Self {
        Self {
            access,
            refresh,
            access_ttl,
            refresh_ttl,
            sessions,
        }
    }

    pub fn access_codec(&self) -> &TokenCodec {
        &self.access
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn mint(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        let mint = || -> Result<TokenPair, TokenError> {
            Ok(TokenPair {
                access_token: self.access.issue(user_id, self.access_ttl)?,
                refresh_token: self.refresh.issue(user_id, self.refresh_ttl)?,
            })
        };

        mint().map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to sign token pair");
            AuthError::TokenGeneration.into()
        })
    }

    /// Issue a fresh pair and make its refresh token the stored one
    pub async fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        let pair = self.mint(user_id)?;

        self.sessions
            .set_refresh_token(user_id, &pair.refresh_token)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to record refresh token");
                AppError::from(AuthError::TokenGeneration)
            })?;

        Ok(pair)
    }

    /// Replace `current` with a freshly issued refresh token
    ///
    /// # Errors
    /// - `AuthError::StaleRefreshToken` if `current` was rotated away
    ///   between the caller's check and this write
    /// - `AuthError::InvalidRefreshToken` if the user no longer exists
    /// - `AuthError::TokenGeneration` on any other codec or store failure
    pub async fn rotate_pair(&self, user_id: Uuid, current: &str) -> Result<TokenPair, AppError> {
        let pair = self.mint(user_id)?;

        let replaced = self
            .sessions
            .rotate_refresh_token(user_id, current, &pair.refresh_token)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => {
                    tracing::warn!(user_id = %user_id, "User removed during refresh");
                    AppError::from(AuthError::InvalidRefreshToken)
                }
                other => {
                    tracing::error!(user_id = %user_id, error = %other, "Failed to rotate refresh token");
                    AppError::from(AuthError::TokenGeneration)
                }
            })?;

        if !replaced {
            tracing::warn!(user_id = %user_id, "Refresh token superseded during rotation");
            return Err(AuthError::StaleRefreshToken.into());
        }

        Ok(pair)
    }

    /// Check a refresh token's signature and expiry, returning its user
    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, TokenError> {
        self.refresh.verify(token)
    }
}
