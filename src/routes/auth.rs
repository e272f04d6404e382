/// Authentication Routes
///
/// Login, logout, refresh and current-user handlers. The flows live in
/// `AuthService`; these handlers only move data between HTTP and it.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, TokenPair};
use crate::cookies::CredentialCookies;
use crate::error::{AppError, AuthError};
use crate::middleware::CurrentUser;
use crate::response::{
    ApiResponse, ACCESS_TOKEN_REFRESHED, CURRENT_USER_FETCHED, SUCCESSFUL_LOGIN, SUCCESSFUL_LOGOUT,
};
use crate::store::UserProfile;
use crate::validators::parse_login;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token refresh request, used when no refresh cookie is sent
#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/v1/users/login
///
/// Authenticate with username or email plus password. Sets the
/// `accessToken` and `refreshToken` cookies and also returns both tokens
/// in the body for clients that cannot use cookies.
///
/// # Errors
/// - 400: Neither username nor email given, or password missing
/// - 404: No user matches the identifier
/// - 401: Wrong password
/// - 500: Token pair could not be issued
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
    cookies: web::Data<CredentialCookies>,
) -> Result<HttpResponse, AppError> {
    let credentials = parse_login(
        form.username.as_deref(),
        form.email.as_deref(),
        form.password.as_deref(),
    )?;

    let session = auth.login(&credentials).await?;

    tracing::info!(user_id = %session.user.id, "Login succeeded");

    let mut response = HttpResponse::Ok();
    cookies.attach(&mut response, &session.tokens);

    Ok(response.json(ApiResponse::new(
        200,
        LoginResponse {
            user: session.user,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        },
        SUCCESSFUL_LOGIN,
    )))
}

/// POST /api/v1/users/logout
///
/// **Requires a valid access token.** Clears the stored refresh token and
/// both credential cookies. Calling it twice is harmless.
pub async fn logout(
    current: web::ReqData<CurrentUser>,
    auth: web::Data<AuthService>,
    cookies: web::Data<CredentialCookies>,
) -> Result<HttpResponse, AppError> {
    let user_id = current.0.id;

    auth.logout(user_id).await?;

    tracing::info!(user_id = %user_id, "Logout succeeded");

    let mut response = HttpResponse::Ok();
    cookies.clear(&mut response);

    Ok(response.json(ApiResponse::new(200, serde_json::json!({}), SUCCESSFUL_LOGOUT)))
}

/// POST /api/v1/users/refresh-token
///
/// Exchange a refresh token (cookie first, then request body) for a new
/// pair. The presented token stops working as soon as this succeeds.
///
/// # Errors
/// - 401 `UNAUTHORIZED`: no refresh token presented
/// - 401 `REFRESH_TOKEN_INVALID`: forged, expired, or user gone
/// - 401 `REFRESH_TOKEN_STALE`: already rotated away or logged out
/// - 500: New pair could not be issued
pub async fn refresh_access_token(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    auth: web::Data<AuthService>,
    cookies: web::Data<CredentialCookies>,
) -> Result<HttpResponse, AppError> {
    let from_cookie = req
        .cookie(cookies.refresh_name())
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty());

    let presented = from_cookie
        .or_else(|| {
            body.and_then(|b| b.into_inner().refresh_token)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let tokens: TokenPair = auth.refresh(&presented).await?;

    tracing::info!("Access token refreshed");

    let mut response = HttpResponse::Ok();
    cookies.attach(&mut response, &tokens);

    Ok(response.json(ApiResponse::new(200, tokens, ACCESS_TOKEN_REFRESHED)))
}

/// GET /api/v1/users/current-user
///
/// **Requires a valid access token.** Returns the sanitized profile the
/// gate attached to the request.
pub async fn current_user(current: web::ReqData<CurrentUser>) -> HttpResponse {
    let CurrentUser(profile) = current.into_inner();
    HttpResponse::Ok().json(ApiResponse::new(200, profile, CURRENT_USER_FETCHED))
}
