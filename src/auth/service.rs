/// Login, logout and refresh flows
///
/// Orchestrates the hasher, the token service and the user store into the
/// three operations exposed over HTTP. Every failure leaves here as an
/// `AppError` with a client-facing kind.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::claims::TokenKind;
use crate::auth::clock::Clock;
use crate::auth::jwt::TokenCodec;
use crate::auth::password::verify_password;
use crate::auth::session::{tokens_match, SessionStore};
use crate::auth::token_service::{TokenPair, TokenService};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{UserProfile, UserStore};
use crate::validators::LoginCredentials;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(tokens: TokenService, users: Arc<dyn UserStore>) -> Self {
        Self { users, tokens }
    }

    /// Build the service from configuration; secrets are read here once
    pub fn from_settings(
        settings: &AuthSettings,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let access = TokenCodec::new(
            TokenKind::Access,
            &settings.access_token_secret,
            settings.issuer.clone(),
            clock.clone(),
        );
        let refresh = TokenCodec::new(
            TokenKind::Refresh,
            &settings.refresh_token_secret,
            settings.issuer.clone(),
            clock,
        );
        let tokens = TokenService::new(
            access,
            settings.access_token_expiry,
            refresh,
            settings.refresh_token_expiry,
            SessionStore::new(users.clone()),
        );

        Self::new(tokens, users)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        self.users.clone()
    }

    /// Check the password and issue a new credential pair
    ///
    /// # Errors
    /// - `UserNotFound` (404) when no user matches the identifier
    /// - `InvalidCredentials` (401) when the password does not match
    /// - `TokenGeneration` (500) when the pair cannot be issued
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, AppError> {
        let user = self
            .users
            .find_by_username_or_email(credentials.username.as_deref(), credentials.email.as_deref())
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => AppError::from(AuthError::UserNotFound),
                other => AppError::from(other),
            })?;

        if !verify_password(&credentials.password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.tokens.issue_pair(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthenticatedSession {
            user: user.profile(),
            tokens,
        })
    }

    /// Drop the stored refresh token; safe to repeat
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.tokens.sessions().clear_refresh_token(user_id).await?;

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Exchange a refresh token for a new pair, retiring the presented one
    ///
    /// # Errors
    /// - `InvalidRefreshToken` when the token is forged, expired or its user is gone
    /// - `StaleRefreshToken` when it is authentic but no longer the stored one
    /// - `TokenGeneration` when the new pair cannot be issued
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AppError> {
        let user_id = self.tokens.verify_refresh(presented).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected by codec");
            AppError::from(AuthError::InvalidRefreshToken)
        })?;

        let stored = self
            .tokens
            .sessions()
            .get_stored_refresh_token(user_id)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => AppError::from(AuthError::InvalidRefreshToken),
                other => AppError::from(other),
            })?;

        match stored {
            Some(current) if tokens_match(presented, &current) => {}
            _ => {
                tracing::warn!(user_id = %user_id, "Superseded refresh token presented");
                return Err(AuthError::StaleRefreshToken.into());
            }
        }

        let pair = self.tokens.rotate_pair(user_id, presented).await?;

        tracing::info!(user_id = %user_id, "Refresh token rotated");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::clock::MockClock;
    use crate::auth::password::hash_password_with_cost;
    use crate::configuration::CookieSettings;
    use crate::store::{InMemoryUserStore, User};
    use crate::validators::parse_login;

    const PASSWORD: &str = "CorrectHorse42";

    struct Fixture {
        service: AuthService,
        users: InMemoryUserStore,
        clock: Arc<MockClock>,
        user_id: Uuid,
    }

    fn fixture() -> Fixture {
        fixture_with_refresh_ttl(604_800)
    }

    fn fixture_with_refresh_ttl(refresh_token_expiry: i64) -> Fixture {
        let settings = AuthSettings {
            access_token_secret: "access-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_secret: "refresh-secret".to_string(),
            refresh_token_expiry,
            issuer: "test".to_string(),
            cookie: CookieSettings::default(),
        };
        let users = InMemoryUserStore::new();
        let hash = hash_password_with_cost(PASSWORD, 4).unwrap();
        let user_id = users
            .insert(User::new("u1", "u1@example.com", "User One", hash))
            .unwrap();
        let clock = Arc::new(MockClock::new(1_700_000_000));
        let service = AuthService::from_settings(&settings, Arc::new(users.clone()), clock.clone());

        Fixture {
            service,
            users,
            clock,
            user_id,
        }
    }

    fn creds(username: &str, password: &str) -> LoginCredentials {
        parse_login(Some(username), None, Some(password)).unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();

        assert_eq!(session.user.id, f.user_id);
        assert_eq!(f.users.refresh_token_of(f.user_id), Some(session.tokens.refresh_token));
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let f = fixture();
        let login = parse_login(None, Some("u1@example.com"), Some(PASSWORD)).unwrap();

        assert!(f.service.login(&login).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let f = fixture();
        let result = f.service.login(&creds("u1", "WrongHorse42")).await;

        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidCredentials))));
        assert_eq!(f.users.refresh_token_of(f.user_id), None);
    }

    #[tokio::test]
    async fn test_login_with_overflowing_ttl_fails_cleanly() {
        let f = fixture_with_refresh_ttl(i64::MAX);
        let result = f.service.login(&creds("u1", PASSWORD)).await;

        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenGeneration))));
        assert_eq!(f.users.refresh_token_of(f.user_id), None);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let f = fixture();
        let result = f.service.login(&creds("ghost", PASSWORD)).await;

        assert!(matches!(result, Err(AppError::Auth(AuthError::UserNotFound))));
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_kills_previous_token() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();

        let renewed = f.service.refresh(&session.tokens.refresh_token).await.unwrap();
        assert_ne!(renewed.refresh_token, session.tokens.refresh_token);

        let reused = f.service.refresh(&session.tokens.refresh_token).await;
        assert!(matches!(reused, Err(AppError::Auth(AuthError::StaleRefreshToken))));

        assert!(f.service.refresh(&renewed.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_supersedes_earlier_refresh_token() {
        let f = fixture();
        let first = f.service.login(&creds("u1", PASSWORD)).await.unwrap();
        let _second = f.service.login(&creds("u1", PASSWORD)).await.unwrap();

        let result = f.service.refresh(&first.tokens.refresh_token).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::StaleRefreshToken))));
    }

    #[tokio::test]
    async fn test_refresh_after_logout_fails() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();

        f.service.logout(f.user_id).await.unwrap();
        f.service.logout(f.user_id).await.unwrap();

        let result = f.service.refresh(&session.tokens.refresh_token).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::StaleRefreshToken))));
    }

    #[tokio::test]
    async fn test_refresh_with_expired_token() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();

        f.clock.advance(604_801);

        let result = f.service.refresh(&session.tokens.refresh_token).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidRefreshToken))));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();

        let result = f.service.refresh(&session.tokens.access_token).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidRefreshToken))));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();
        f.users.remove(f.user_id).unwrap();

        let result = f.service.refresh(&session.tokens.refresh_token).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidRefreshToken))));
    }

    #[tokio::test]
    async fn test_parallel_refresh_only_one_wins() {
        let f = fixture();
        let session = f.service.login(&creds("u1", PASSWORD)).await.unwrap();
        let token = session.tokens.refresh_token.clone();

        let (a, b) = futures::join!(f.service.refresh(&token), f.service.refresh(&token));

        let outcomes = [a, b];
        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        let stale = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::Auth(AuthError::StaleRefreshToken))))
            .count();

        assert_eq!(wins, 1);
        assert_eq!(stale, 1);
    }
}
