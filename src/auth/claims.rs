/// JWT Claims structure
///
/// Payload shared by access and refresh tokens: the user identifier plus
/// issuance metadata. The two kinds differ only in `token_type`, lifetime
/// and signing secret.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Which credential a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    pub token_type: TokenKind,
    /// Unique per token, so two tokens minted in the same second differ
    pub jti: String,
}

impl Claims {
    /// Create claims valid from `now` for `expiry_seconds`
    ///
    /// # Errors
    /// Returns `TokenError::Encoding` if the expiry does not fit an `i64`
    pub fn new(
        user_id: Uuid,
        token_type: TokenKind,
        expiry_seconds: i64,
        issuer: String,
        now: i64,
    ) -> Result<Self, TokenError> {
        let exp = now
            .checked_add(expiry_seconds)
            .ok_or_else(|| TokenError::Encoding("token expiry overflows".to_string()))?;

        Ok(Self {
            sub: user_id.to_string(),
            iat: now,
            exp,
            iss: issuer,
            token_type,
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `TokenError::Malformed` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }

    /// A token is still valid at its exact expiry second
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }
}
