/// Login input normalisation
///
/// Fields that are absent or blank after trimming are treated as missing.
/// Usernames are stored lower-cased, so lookups are lower-cased too.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_IDENTIFIER_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validated login input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

fn present(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}

fn within_limit(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong(field.to_string(), MAX_IDENTIFIER_LENGTH));
    }
    Ok(())
}

/// Validate login fields
///
/// # Errors
/// - `MissingIdentifier` when neither username nor email is given
/// - `EmptyField("password")` when the password is missing or blank
/// - `TooLong` / `InvalidFormat` for oversized or malformed identifiers
pub fn parse_login(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<LoginCredentials, ValidationError> {
    let username = present(username);
    let email = present(email);

    if username.is_none() && email.is_none() {
        return Err(ValidationError::MissingIdentifier);
    }

    // The password is checked for blankness but passed on untrimmed
    let password = match password {
        Some(p) if !p.trim().is_empty() => p.to_string(),
        _ => return Err(ValidationError::EmptyField("password".to_string())),
    };

    if let Some(name) = username {
        within_limit("username", name)?;
    }

    if let Some(mail) = email {
        within_limit("email", mail)?;
        if !EMAIL_REGEX.is_match(mail) {
            return Err(ValidationError::InvalidFormat("email".to_string()));
        }
    }

    Ok(LoginCredentials {
        username: username.map(str::to_lowercase),
        email: email.map(str::to_string),
        password,
    })
}
