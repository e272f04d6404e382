/// Error Handling Module
///
/// Every failure raised by the hasher, the token codec, the session store
/// or the token service is converted into one `AppError` variant before it
/// reaches the HTTP layer. `AppError` implements `ResponseError`, which makes
/// it the single place where failures are rendered into the uniform error
/// envelope.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use tracing::Level;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for request input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(String),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("Please provide your username or email and try again.")]
    MissingIdentifier,
}

/// Token codec failures
///
/// Kept distinct so tests can tell a forged token from an expired one.
/// Callers outside the codec collapse all of them into one auth error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token claims rejected: {0}")]
    Rejected(String),
    #[error("token has expired")]
    Expired,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// User store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Query error: {0}")]
    QueryExecution(String),
    #[error("Database connection error: {0}")]
    ConnectionPool(String),
    #[error("Database error: {0}")]
    UnexpectedError(String),
}

/// Authentication errors surfaced to clients
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized request")]
    MissingToken,
    #[error("Invalid Access Token")]
    InvalidAccessToken,
    #[error("Invalid Refresh Token")]
    InvalidRefreshToken,
    #[error("Refresh token is expired or used")]
    StaleRefreshToken,
    #[error("The provided credentials are invalid. Please verify your username or email and password and try again.")]
    InvalidCredentials,
    #[error("User not found. Please ensure that the username or email provided is correct and try again.")]
    UserNotFound,
    #[error("An error occurred during the generation of the refresh and access tokens. Please try again later.")]
    TokenGeneration,
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required config: {0}")]
    MissingRequired(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            sqlx::Error::Database(db) => DatabaseError::QueryExecution(db.to_string()),
            other => DatabaseError::UnexpectedError(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.into())
    }
}

impl AppError {
    /// Machine-readable code placed in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(e) => match e {
                DatabaseError::NotFound(_) => "NOT_FOUND",
                DatabaseError::ConnectionPool(_) => "SERVICE_UNAVAILABLE",
                _ => "DATABASE_ERROR",
            },
            AppError::Auth(e) => match e {
                AuthError::MissingToken => "UNAUTHORIZED",
                AuthError::InvalidAccessToken => "TOKEN_INVALID",
                AuthError::InvalidRefreshToken => "REFRESH_TOKEN_INVALID",
                AuthError::StaleRefreshToken => "REFRESH_TOKEN_STALE",
                AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                AuthError::UserNotFound => "USER_NOT_FOUND",
                AuthError::TokenGeneration => "TOKEN_GENERATION_FAILED",
            },
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the caller
    ///
    /// Store, config and internal failures never leak their detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Database(DatabaseError::NotFound(_)) => "Record not found".to_string(),
            AppError::Database(DatabaseError::ConnectionPool(_)) => {
                "Database service temporarily unavailable".to_string()
            }
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "Internal Server Error".to_string(),
        }
    }

    /// Severity this error is logged at
    ///
    /// Failed logins and replayed refresh tokens are security events and
    /// log at `warn`; server-side failures at `error`.
    pub fn log_level(&self) -> Level {
        match self {
            AppError::Validation(_) => Level::WARN,
            AppError::Auth(AuthError::InvalidCredentials)
            | AppError::Auth(AuthError::UserNotFound)
            | AppError::Auth(AuthError::StaleRefreshToken) => Level::WARN,
            AppError::Auth(AuthError::TokenGeneration) => Level::ERROR,
            AppError::Auth(_) => Level::INFO,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => Level::ERROR,
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Uniform error envelope
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    /// Error code for client-side handling
    pub code: String,
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status_code: u16) -> Self {
        Self {
            status_code,
            message,
            success: false,
            code,
            error_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, error_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse) {
        let status = ResponseError::status_code(self);
        let response = ErrorResponse::new(
            error_id.to_string(),
            self.public_message(),
            self.code().to_string(),
            status.as_u16(),
        );
        (status, response)
    }

    fn log_error(&self, error_id: &str) {
        let code = self.code();
        let level = self.log_level();

        if level == Level::ERROR {
            tracing::error!(error_id = error_id, code, error = %self, "Request failed");
        } else if level == Level::WARN {
            tracing::warn!(error_id = error_id, code, error = %self, "Request rejected");
        } else {
            tracing::info!(error_id = error_id, code, error = %self, "Request rejected");
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match e {
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                DatabaseError::ConnectionPool(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Auth(e) => match e {
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::TokenGeneration => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, body) = <Self as ErrorHandler>::error_response(self, &error_id);
        HttpResponse::build(status).json(body)
    }
}

/// Converts JSON body extraction failures into the error envelope
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::Validation(ValidationError::InvalidFormat(format!("request body ({})", err))).into()
}
