/// JWT Token Codec
///
/// Signs and verifies the compact tokens used as access and refresh
/// credentials. Verification checks format, signature and issuer first and
/// only then compares `exp` against the injected clock, so a forged token
/// and an expired one fail with different `TokenError`s.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::clock::Clock;
use crate::error::TokenError;

/// Signs and verifies tokens of a single kind
///
/// Keys are derived once at construction and shared behind `Arc`, so
/// clones are cheap enough to hand to every worker.
#[derive(Clone)]
pub struct TokenCodec {
    kind: TokenKind,
    issuer: String,
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(
        kind: TokenKind,
        secret: &str,
        issuer: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            kind,
            issuer: issuer.into(),
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            clock,
        }
    }

    /// Issue a token for `user_id` that expires `ttl_seconds` from now
    ///
    /// # Errors
    /// Returns `TokenError::Encoding` if signing fails or the expiry overflows
    pub fn issue(&self, user_id: Uuid, ttl_seconds: i64) -> Result<String, TokenError> {
        let claims = Claims::new(
            user_id,
            self.kind,
            ttl_seconds,
            self.issuer.clone(),
            self.clock.now(),
        )?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token and return the user it was issued for
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode(token)?.user_id()
    }

    /// Verify a token and return its full claims
    ///
    /// # Errors
    /// - `Malformed` / `InvalidSignature` / `Rejected` when the token is not
    ///   an authentic token of this codec's kind
    /// - `Expired` when it is authentic but `exp` has passed
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against our own clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer => TokenError::Rejected("issuer".to_string()),
                ErrorKind::MissingRequiredClaim(claim) => TokenError::Rejected(claim.clone()),
                _ => TokenError::Malformed,
            })?;

        if claims.token_type != self.kind {
            return Err(TokenError::Rejected("token_type".to_string()));
        }

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
