/// Password Hashing and Verification
///
/// One-way salted bcrypt hashing. `bcrypt::verify` compares digests in
/// constant time.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

/// bcrypt ignores input past 72 bytes, so longer passwords are refused
/// rather than silently truncated.
const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt at the default cost
///
/// # Errors
/// Returns error if:
/// - Password is empty or blank
/// - Password exceeds 72 bytes
/// - Bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hash a password at an explicit bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()).into());
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES).into());
    }

    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// A digest that bcrypt cannot parse counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        return false;
    }

    verify(password, password_hash).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be parsed");
        false
    })
}
